//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AdminAuthenticator, CodeAdministration, PlayerAccess, PlayerAdministration, PrizeCatalogue,
    SpinCommand, SpinHistoryQuery, StatsQuery,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use spinwheel::inbound::http::state::HttpState;
///
/// fn share(state: HttpState) -> actix_web::web::Data<HttpState> {
///     actix_web::web::Data::new(state)
/// }
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub spins: Arc<dyn SpinCommand>,
    pub history: Arc<dyn SpinHistoryQuery>,
    pub players: Arc<dyn PlayerAccess>,
    pub player_admin: Arc<dyn PlayerAdministration>,
    pub admin_auth: Arc<dyn AdminAuthenticator>,
    pub codes: Arc<dyn CodeAdministration>,
    pub prizes: Arc<dyn PrizeCatalogue>,
    pub stats: Arc<dyn StatsQuery>,
}
