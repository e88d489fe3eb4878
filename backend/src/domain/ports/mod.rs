//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, event fan-out) describe what the domain needs
//! from infrastructure. Driving ports (commands and queries) describe what
//! inbound adapters may ask of the domain, so handler tests can substitute
//! doubles instead of wiring persistence.

mod macros;
pub(crate) use macros::define_port_error;

mod admin_authenticator;
mod code_administration;
mod code_repository;
mod event_publisher;
mod event_subscriber;
mod live_presence;
mod player_access;
mod player_administration;
mod player_repository;
mod prize_catalogue;
mod prize_repository;
mod spin_command;
mod spin_history_query;
mod spin_log_repository;
mod stats_query;

#[cfg(test)]
pub use admin_authenticator::MockAdminAuthenticator;
pub use admin_authenticator::AdminAuthenticator;
#[cfg(test)]
pub use code_administration::MockCodeAdministration;
pub use code_administration::{CodeAdministration, CodeListRequest, GenerateCodesRequest};
#[cfg(test)]
pub use code_repository::MockCodeRepository;
pub use code_repository::{CodeListQuery, CodeRepository, CodeRepositoryError};
#[cfg(test)]
pub use event_publisher::MockEventPublisher;
pub use event_publisher::{EventPublishError, EventPublisher, NoOpEventPublisher};
pub use event_subscriber::{EventSubscriber, LiveReceiver};
#[cfg(test)]
pub use live_presence::MockLivePresence;
pub use live_presence::LivePresence;
#[cfg(test)]
pub use player_access::MockPlayerAccess;
pub use player_access::{PlayerAccess, SignInOutcome};
#[cfg(test)]
pub use player_administration::MockPlayerAdministration;
pub use player_administration::PlayerAdministration;
#[cfg(test)]
pub use player_repository::MockPlayerRepository;
pub use player_repository::{PlayerRepository, PlayerRepositoryError};
#[cfg(test)]
pub use prize_catalogue::MockPrizeCatalogue;
pub use prize_catalogue::{PrizeCatalogue, PrizeInput};
#[cfg(test)]
pub use prize_repository::MockPrizeRepository;
pub use prize_repository::{PrizeRepository, PrizeRepositoryError};
#[cfg(test)]
pub use spin_command::MockSpinCommand;
pub use spin_command::{SpinCommand, SpinOutcome, SpinRequest, WonPrize};
#[cfg(test)]
pub use spin_history_query::MockSpinHistoryQuery;
pub use spin_history_query::{SpinHistoryQuery, SpinLogListRequest};
#[cfg(test)]
pub use spin_log_repository::MockSpinLogRepository;
pub use spin_log_repository::{SpinLogRepository, SpinLogRepositoryError};
#[cfg(test)]
pub use stats_query::MockStatsQuery;
pub use stats_query::{AdminStats, RECENT_ACTIVITY_LIMIT, StatsQuery};
