//! Driving port for reading spin history and the admin audit log.

use async_trait::async_trait;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Page, SpinHistoryEntry, SpinLog};

/// Raw admin log filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SpinLogListRequest {
    /// `today`, `7d`, `30d` or a `YYYY-MM-DD` day.
    pub range: Option<String>,
    /// Matched against the code or the username.
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Domain use-case port for spin history reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpinHistoryQuery: Send + Sync {
    /// Latest spins recorded for a username, newest first.
    async fn history(&self, username: &str) -> Result<Vec<SpinHistoryEntry>, Error>;

    /// Filtered and paginated audit log.
    async fn logs(&self, request: SpinLogListRequest) -> Result<Page<SpinLog>, Error>;
}
