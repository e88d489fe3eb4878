//! Live events relayed to connected dashboards.
//!
//! Events are transport agnostic. The WebSocket adapter turns them into
//! `{ "event": <name>, "data": <payload> }` frames.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;
use uuid::Uuid;

use super::player::{Player, PlayerId, Username};
use super::prize::Prize;
use super::spin_log::SpinLog;

/// Audience of a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiveScope {
    /// Any connected player.
    Public,
    /// Authenticated administrators only.
    Admin,
}

/// Aggregate counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    /// Players with the `user` role.
    pub total_users: u64,
    /// Distinct players with at least one open live connection.
    pub active_users: u64,
    pub total_spins: u64,
    /// Codes in the `active` state.
    pub available_codes: u64,
    pub used_codes: u64,
}

/// Discrete domain events and KPI refreshes.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    KpiUpdate(KpiSnapshot),
    SpinRecorded(SpinLog),
    CodesGenerated { count: usize },
    PlayerCreated(Player),
    PlayerLoggedIn { id: PlayerId, username: Username },
    PlayerLoggedOut { id: PlayerId, username: Username },
    PlayerUpdated { id: PlayerId, is_blocked: bool },
    PrizeCreated(Prize),
    PrizeUpdated(Prize),
    PrizeDeleted(Uuid),
    ProbabilitiesUpdated,
}

impl LiveEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::KpiUpdate(_) => "kpi:update",
            Self::SpinRecorded(_) => "spin:new",
            Self::CodesGenerated { .. } => "code:new",
            Self::PlayerCreated(_) => "user:new",
            Self::PlayerLoggedIn { .. } => "user:login",
            Self::PlayerLoggedOut { .. } => "user:logout",
            Self::PlayerUpdated { .. } => "user:update",
            Self::PrizeCreated(_) => "prize:new",
            Self::PrizeUpdated(_) => "prize:update",
            Self::PrizeDeleted(_) => "prize:delete",
            Self::ProbabilitiesUpdated => "prize:probabilities-updated",
        }
    }

    /// JSON payload of the event.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::KpiUpdate(snapshot) => serde_json::to_value(snapshot),
            Self::SpinRecorded(log) => serde_json::to_value(log),
            Self::CodesGenerated { count } => Ok(json!({ "count": count })),
            Self::PlayerCreated(player) => serde_json::to_value(player),
            Self::PlayerLoggedIn { id, username } | Self::PlayerLoggedOut { id, username } => {
                Ok(json!({ "id": id, "username": username }))
            }
            Self::PlayerUpdated { id, is_blocked } => {
                Ok(json!({ "id": id, "isBlocked": is_blocked }))
            }
            Self::PrizeCreated(prize) | Self::PrizeUpdated(prize) => serde_json::to_value(prize),
            Self::PrizeDeleted(id) => Ok(json!({ "id": id })),
            Self::ProbabilitiesUpdated => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    fn login_payload_carries_id_and_username() {
        let id = PlayerId::from_uuid(Uuid::nil());
        let username = Username::new("alice").expect("valid");
        let event = LiveEvent::PlayerLoggedIn { id, username };
        assert_eq!(event.name(), "user:login");
        assert_eq!(
            event.payload().expect("payload"),
            json!({"id": "00000000-0000-0000-0000-000000000000", "username": "alice"})
        );
    }

    #[rstest]
    fn kpi_payload_uses_camel_case() {
        let event = LiveEvent::KpiUpdate(KpiSnapshot {
            total_users: 3,
            active_users: 1,
            total_spins: 7,
            available_codes: 10,
            used_codes: 7,
        });
        insta::assert_json_snapshot!(event.payload().expect("payload"), @r###"
        {
          "activeUsers": 1,
          "availableCodes": 10,
          "totalSpins": 7,
          "totalUsers": 3,
          "usedCodes": 7
        }
        "###);
    }

    #[rstest]
    fn spin_payload_is_the_log_entry() {
        let log = SpinLog {
            id: Uuid::nil(),
            code: "TEST001".into(),
            prize: "Jackpot".into(),
            player_id: None,
            username: "alice".into(),
            timestamp: Utc::now(),
        };
        let payload = LiveEvent::SpinRecorded(log.clone())
            .payload()
            .expect("payload");
        assert_eq!(payload["code"], "TEST001");
        assert_eq!(payload["username"], "alice");
    }

    #[rstest]
    #[case(LiveEvent::CodesGenerated { count: 5 }, "code:new", json!({"count": 5}))]
    #[case(LiveEvent::PrizeDeleted(Uuid::nil()), "prize:delete", json!({"id": Uuid::nil()}))]
    #[case(LiveEvent::ProbabilitiesUpdated, "prize:probabilities-updated", Value::Null)]
    #[case(
        LiveEvent::PlayerUpdated { id: PlayerId::from_uuid(Uuid::nil()), is_blocked: true },
        "user:update",
        json!({"id": Uuid::nil(), "isBlocked": true})
    )]
    fn simple_events_have_stable_names(
        #[case] event: LiveEvent,
        #[case] name: &str,
        #[case] payload: Value,
    ) {
        assert_eq!(event.name(), name);
        assert_eq!(event.payload().expect("payload"), payload);
    }
}
