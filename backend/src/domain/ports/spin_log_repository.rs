//! Port for the append-only spin audit log.

use async_trait::async_trait;

use crate::domain::{NewSpinLog, Page, SpinLog, SpinLogQuery};

use super::define_port_error;

define_port_error! {
    /// Errors raised by spin log repository adapters.
    pub enum SpinLogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "spin log repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "spin log repository query failed: {message}",
    }
}

/// Port for appending and reading spin logs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpinLogRepository: Send + Sync {
    /// Append one record.
    async fn append(&self, entry: &NewSpinLog) -> Result<SpinLog, SpinLogRepositoryError>;

    /// Latest records for a username, newest first.
    async fn history_for(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<SpinLog>, SpinLogRepositoryError>;

    /// Filtered, paginated listing, newest first.
    async fn list(&self, query: &SpinLogQuery) -> Result<Page<SpinLog>, SpinLogRepositoryError>;

    /// Total number of records.
    async fn count(&self) -> Result<u64, SpinLogRepositoryError>;
}
