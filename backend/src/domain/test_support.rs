//! Shared doubles for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use super::ports::{
    EventPublisher, MockCodeRepository, MockPlayerRepository, MockSpinLogRepository,
};
use super::{LiveStatsBroadcaster, Player, PlayerId, PlayerRole, PresenceTracker, Username};

/// Clock frozen at a fixed instant.
pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
        .expect("fixture timestamp parses")
        .with_timezone(&Utc)
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn player(name: &str) -> Player {
    Player {
        id: PlayerId::random(),
        username: Username::new(name).expect("fixture username is valid"),
        role: PlayerRole::User,
        is_blocked: false,
        created_at: fixture_timestamp(),
    }
}

/// Broadcaster whose counters all read zero, publishing to `publisher`.
pub(crate) fn quiet_broadcaster(publisher: Arc<dyn EventPublisher>) -> LiveStatsBroadcaster {
    let mut players = MockPlayerRepository::new();
    players.expect_count_regular().returning(|| Ok(0));
    let mut codes = MockCodeRepository::new();
    codes.expect_count().returning(|_| Ok(0));
    let mut logs = MockSpinLogRepository::new();
    logs.expect_count().returning(|| Ok(0));
    LiveStatsBroadcaster::new(
        Arc::new(players),
        Arc::new(codes),
        Arc::new(logs),
        Arc::new(PresenceTracker::default()),
        publisher,
    )
}
