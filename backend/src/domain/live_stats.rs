//! Dashboard counters and best-effort event relay.
//!
//! [`LiveStatsBroadcaster`] recomputes the KPI snapshot from the stores and
//! the presence tracker, then pushes it to the admin scope. Every failure on
//! this path is logged and swallowed: a broken dashboard must never fail the
//! spin, login, or code generation that triggered the refresh.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ports::{
    CodeRepository, EventPublisher, LivePresence, PlayerRepository, SpinLogRepository,
};
use super::repository_errors::{map_code_error, map_player_error, map_spin_log_error};
use super::{
    CodeStatus, ConnectionId, Error, KpiSnapshot, LiveEvent, LiveScope, PlayerId,
    PresenceTracker, PresenceTransition,
};

/// Computes KPI snapshots and relays events to dashboards.
#[derive(Clone)]
pub struct LiveStatsBroadcaster {
    players: Arc<dyn PlayerRepository>,
    codes: Arc<dyn CodeRepository>,
    logs: Arc<dyn SpinLogRepository>,
    presence: Arc<PresenceTracker>,
    publisher: Arc<dyn EventPublisher>,
}

impl LiveStatsBroadcaster {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        codes: Arc<dyn CodeRepository>,
        logs: Arc<dyn SpinLogRepository>,
        presence: Arc<PresenceTracker>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            players,
            codes,
            logs,
            presence,
            publisher,
        }
    }

    /// Read every counter once.
    pub async fn snapshot(&self) -> Result<KpiSnapshot, Error> {
        let total_users = self
            .players
            .count_regular()
            .await
            .map_err(map_player_error)?;
        let total_spins = self.logs.count().await.map_err(map_spin_log_error)?;
        let available_codes = self
            .codes
            .count(Some(CodeStatus::Active))
            .await
            .map_err(map_code_error)?;
        let used_codes = self
            .codes
            .count(Some(CodeStatus::Used))
            .await
            .map_err(map_code_error)?;
        Ok(KpiSnapshot {
            total_users,
            active_users: u64::try_from(self.presence.count()).unwrap_or(u64::MAX),
            total_spins,
            available_codes,
            used_codes,
        })
    }

    /// Recompute the snapshot and push `kpi:update` to administrators.
    pub async fn broadcast_kpis(&self) {
        match self.snapshot().await {
            Ok(snapshot) => self.publish(LiveScope::Admin, LiveEvent::KpiUpdate(snapshot)),
            Err(error) => warn!(%error, "failed to compute dashboard counters"),
        }
    }

    /// Publish an event to administrators.
    pub fn publish_admin(&self, event: LiveEvent) {
        self.publish(LiveScope::Admin, event);
    }

    fn publish(&self, scope: LiveScope, event: LiveEvent) {
        let name = event.name();
        match self.publisher.publish(scope, event) {
            Ok(receivers) => debug!(event = name, receivers, "live event published"),
            Err(error) => warn!(%error, event = name, "failed to publish live event"),
        }
    }
}

/// Presence bookkeeping that refreshes the dashboard on transitions.
#[derive(Clone)]
pub struct PresenceService {
    tracker: Arc<PresenceTracker>,
    broadcaster: LiveStatsBroadcaster,
}

impl PresenceService {
    pub fn new(tracker: Arc<PresenceTracker>, broadcaster: LiveStatsBroadcaster) -> Self {
        Self {
            tracker,
            broadcaster,
        }
    }
}

#[async_trait]
impl LivePresence for PresenceService {
    async fn connected(&self, player: PlayerId, connection: ConnectionId) {
        if self.tracker.register(player, connection) == PresenceTransition::Online {
            debug!(%player, "player online");
            self.broadcaster.broadcast_kpis().await;
        }
    }

    async fn disconnected(&self, player: PlayerId, connection: ConnectionId) {
        if self.tracker.unregister(player, connection) == PresenceTransition::Offline {
            debug!(%player, "player offline");
            self.broadcaster.broadcast_kpis().await;
        }
    }

    async fn snapshot(&self) -> Result<KpiSnapshot, Error> {
        self.broadcaster.snapshot().await
    }
}
