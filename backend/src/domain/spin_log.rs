//! Audit records of successful spins and the queries over them.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::player::PlayerId;

/// Number of entries returned by a player's history.
pub const HISTORY_LIMIT: u32 = 100;
/// Default admin log page size.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;
/// Largest admin page size accepted.
pub const MAX_PAGE_LIMIT: u32 = 200;

/// Immutable record of one successful redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinLog {
    pub id: Uuid,
    pub code: String,
    pub prize: String,
    pub player_id: Option<PlayerId>,
    pub username: String,
    pub timestamp: DateTime<Utc>,
}

/// Fields required to append a spin log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpinLog {
    pub code: String,
    pub prize: String,
    pub player_id: PlayerId,
    pub username: String,
    pub timestamp: DateTime<Utc>,
}

impl NewSpinLog {
    /// Materialise the record with a fresh identifier.
    pub fn into_log(self) -> SpinLog {
        SpinLog {
            id: Uuid::new_v4(),
            code: self.code,
            prize: self.prize,
            player_id: Some(self.player_id),
            username: self.username,
            timestamp: self.timestamp,
        }
    }
}

/// Errors raised while parsing log query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogQueryError {
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

/// Date window applied to the admin log listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRange {
    Today,
    Last7Days,
    Last30Days,
    Day(NaiveDate),
}

impl LogRange {
    /// Parse `today`, `7d`, `30d` or a `YYYY-MM-DD` calendar day.
    pub fn parse(raw: &str) -> Result<Self, LogQueryError> {
        match raw.trim() {
            "today" => Ok(Self::Today),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(Self::Day)
                .map_err(|_| LogQueryError::InvalidRange(other.to_owned())),
        }
    }

    /// Inclusive lower and exclusive upper bound relative to `now` (UTC days).
    pub fn window(self, now: DateTime<Utc>) -> TimeWindow {
        let start_of = |day: NaiveDate| day.and_time(NaiveTime::MIN).and_utc();
        let today = start_of(now.date_naive());
        match self {
            Self::Today => TimeWindow {
                from: Some(today),
                until: None,
            },
            Self::Last7Days => TimeWindow {
                from: Some(now - Duration::days(7)),
                until: None,
            },
            Self::Last30Days => TimeWindow {
                from: Some(now - Duration::days(30)),
                until: None,
            },
            Self::Day(day) => {
                let from = start_of(day);
                TimeWindow {
                    from: Some(from),
                    until: Some(from + Duration::days(1)),
                }
            }
        }
    }
}

/// Half-open time interval; missing bounds are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Whether `at` lies inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.until.is_none_or(|until| at < until)
    }
}

/// One-based page request, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Clamp raw values; `None` falls back to page 1 and the default limit.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A page of results with the unpaged total.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    /// Assemble a page from already-sliced items.
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            limit: request.limit(),
        }
    }

    /// Total number of pages for the request's limit.
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.max(1)))
    }
}

/// Resolved admin log query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpinLogQuery {
    pub window: TimeWindow,
    /// Matched against the code (upper-cased) or the username (case-insensitive).
    pub search: Option<String>,
    pub page: PageRequest,
}

impl SpinLogQuery {
    /// Whether a log matches the window and search term.
    pub fn matches(&self, log: &SpinLog) -> bool {
        if !self.window.contains(log.timestamp) {
            return false;
        }
        match self.search.as_deref() {
            None => true,
            Some(term) => {
                log.code.contains(&term.to_uppercase())
                    || log.username.to_lowercase().contains(&term.to_lowercase())
            }
        }
    }
}

/// Entry of a player's spin history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinHistoryEntry {
    pub code: String,
    pub prize: String,
    pub timestamp: DateTime<Utc>,
}

impl From<SpinLog> for SpinHistoryEntry {
    fn from(value: SpinLog) -> Self {
        Self {
            code: value.code,
            prize: value.prize,
            timestamp: value.timestamp,
        }
    }
}
