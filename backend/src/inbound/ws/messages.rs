//! Wire frames for the live channels.
//!
//! Every frame is `{ "event": <name>, "data": <payload> }`.

use serde::Serialize;
use serde_json::Value;

use crate::domain::{KpiSnapshot, LiveEvent};

/// Outbound live frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveFrame {
    pub event: &'static str,
    pub data: Value,
}

impl TryFrom<&LiveEvent> for LiveFrame {
    type Error = serde_json::Error;

    fn try_from(event: &LiveEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            event: event.name(),
            data: event.payload()?,
        })
    }
}

impl LiveFrame {
    /// Initial frame sent to a dashboard when it connects.
    pub fn kpi(snapshot: KpiSnapshot) -> Result<Self, serde_json::Error> {
        Self::try_from(&LiveEvent::KpiUpdate(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn kpi_frame_wraps_the_snapshot() {
        let frame = LiveFrame::kpi(KpiSnapshot {
            total_users: 2,
            active_users: 1,
            total_spins: 5,
            available_codes: 3,
            used_codes: 5,
        })
        .expect("frame");
        insta::assert_json_snapshot!(frame, @r###"
        {
          "event": "kpi:update",
          "data": {
            "activeUsers": 1,
            "availableCodes": 3,
            "totalSpins": 5,
            "totalUsers": 2,
            "usedCodes": 5
          }
        }
        "###);
    }

    #[test]
    fn deleted_prize_frame_carries_the_id() {
        let frame = LiveFrame::try_from(&LiveEvent::PrizeDeleted(Uuid::nil())).expect("frame");
        assert_eq!(
            serde_json::to_value(frame).expect("json"),
            json!({"event": "prize:delete", "data": {"id": Uuid::nil()}})
        );
    }
}
