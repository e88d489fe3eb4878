//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services that implement the driving ports.
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - SpinCode, Prize, Player, SpinLog: the stored records.
//! - RedemptionService: consumes a code once and draws a prize.
//! - LiveStatsBroadcaster, PresenceTracker: dashboard counters and presence.

pub mod auth;
pub mod code;
pub mod code_admin;
pub mod error;
pub mod events;
pub mod history;
pub mod live_stats;
pub mod player;
pub mod player_access;
pub mod player_admin;
pub mod ports;
pub mod presence;
pub mod prize;
pub mod prize_admin;
pub mod redemption;
mod repository_errors;
pub mod selection;
pub mod spin_log;
pub mod stats;
#[cfg(test)]
pub(crate) mod test_support;
pub mod trace_id;

pub use self::auth::{
    AdminCredentials, AdminIdentity, AdminLoginValidationError, ConfiguredAdminAuthenticator,
};
pub use self::code::{
    CODE_MAX_LEN, CodeRejection, CodeStatus, CodeValidationError, CodeValue, Redemption,
    RedemptionClaim, RedemptionColumns, SpinCode,
};
pub use self::code_admin::{
    CODE_ALPHABET, CodeAdminService, DEFAULT_CODE_LENGTH, GenerationPlan, MAX_CODE_LENGTH,
    MAX_GENERATE_COUNT, MIN_CODE_LENGTH, MIN_GENERATE_COUNT,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::events::{KpiSnapshot, LiveEvent, LiveScope};
pub use self::history::SpinHistoryService;
pub use self::live_stats::{LiveStatsBroadcaster, PresenceService};
pub use self::player::{Player, PlayerId, PlayerRole, PlayerValidationError, USERNAME_MAX, Username};
pub use self::player_access::PlayerAccessService;
pub use self::player_admin::PlayerAdminService;
pub use self::presence::{ConnectionId, PresenceTracker, PresenceTransition};
pub use self::prize::{
    DEFAULT_PRIZE_COLOR, DEFAULT_PRIZE_PROBABILITY, DEFAULT_PRIZES, DefaultPrize,
    PROBABILITY_TOLERANCE, Prize, PrizeCandidate, PrizeDraft, PrizeKey, PrizePatch,
    PrizeValidationError, ProbabilityUpdate, assign_orders, validate_probability_batch,
};
pub use self::prize_admin::PrizeAdminService;
pub use self::redemption::{RedemptionError, RedemptionPorts, RedemptionService};
pub use self::selection::{
    DrawSource, SeededDraw, ThreadRngDraw, Weighted, pick_by_draw, select_weighted,
    total_weight, uniform_draw,
};
pub use self::spin_log::{
    DEFAULT_PAGE_LIMIT, HISTORY_LIMIT, LogQueryError, LogRange, MAX_PAGE_LIMIT, NewSpinLog, Page,
    PageRequest, SpinHistoryEntry, SpinLog, SpinLogQuery, TimeWindow,
};
pub use self::stats::StatsService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use spinwheel::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
