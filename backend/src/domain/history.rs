//! Spin history for players and the admin audit log.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::ports::{SpinHistoryQuery, SpinLogListRequest, SpinLogRepository};
use super::repository_errors::map_spin_log_error;
use super::{
    Error, HISTORY_LIMIT, LogRange, Page, PageRequest, SpinHistoryEntry, SpinLog, SpinLogQuery,
    TimeWindow,
};

/// Read-side service implementing [`SpinHistoryQuery`].
#[derive(Clone)]
pub struct SpinHistoryService {
    logs: Arc<dyn SpinLogRepository>,
    clock: Arc<dyn Clock>,
    history_limit: u32,
}

impl SpinHistoryService {
    pub fn new(logs: Arc<dyn SpinLogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            logs,
            clock,
            history_limit: HISTORY_LIMIT,
        }
    }

    /// Override the number of entries returned per player.
    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    fn resolve(&self, request: SpinLogListRequest) -> Result<SpinLogQuery, Error> {
        let window = match request.range.as_deref().map(str::trim) {
            None | Some("") | Some("all") => TimeWindow::default(),
            Some(raw) => LogRange::parse(raw)
                .map_err(|err| Error::invalid_request(err.to_string()))?
                .window(self.clock.utc()),
        };
        Ok(SpinLogQuery {
            window,
            search: request
                .search
                .map(|term| term.trim().to_owned())
                .filter(|term| !term.is_empty()),
            page: PageRequest::new(request.page, request.limit),
        })
    }
}

#[async_trait]
impl SpinHistoryQuery for SpinHistoryService {
    async fn history(&self, username: &str) -> Result<Vec<SpinHistoryEntry>, Error> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::invalid_request("Username is required"));
        }
        let logs = self
            .logs
            .history_for(username, self.history_limit)
            .await
            .map_err(map_spin_log_error)?;
        Ok(logs.into_iter().map(SpinHistoryEntry::from).collect())
    }

    async fn logs(&self, request: SpinLogListRequest) -> Result<Page<SpinLog>, Error> {
        let query = self.resolve(request)?;
        self.logs.list(&query).await.map_err(map_spin_log_error)
    }
}
