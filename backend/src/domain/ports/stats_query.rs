//! Driving port for the admin statistics summary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, SpinCode};

/// Number of redemptions listed in the summary.
pub const RECENT_ACTIVITY_LIMIT: u32 = 10;

/// Admin dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_codes: u64,
    pub active_codes: u64,
    pub used_codes: u64,
    pub total_users: u64,
    pub recent_activity: Vec<SpinCode>,
}

/// Domain use-case port for statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsQuery: Send + Sync {
    async fn stats(&self) -> Result<AdminStats, Error>;
}
