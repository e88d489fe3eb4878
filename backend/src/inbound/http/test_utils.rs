//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;

use crate::domain::ports::{
    MockAdminAuthenticator, MockCodeAdministration, MockPlayerAccess, MockPlayerAdministration,
    MockPrizeCatalogue, MockSpinCommand, MockSpinHistoryQuery, MockStatsQuery,
};
use crate::inbound::http::state::HttpState;

/// Session middleware with a fresh key and an insecure `session` cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set by a response.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Mock for every driving port; unexpected calls panic.
#[derive(Default)]
pub struct MockPorts {
    pub spins: MockSpinCommand,
    pub history: MockSpinHistoryQuery,
    pub players: MockPlayerAccess,
    pub player_admin: MockPlayerAdministration,
    pub admin_auth: MockAdminAuthenticator,
    pub codes: MockCodeAdministration,
    pub prizes: MockPrizeCatalogue,
    pub stats: MockStatsQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState {
            spins: Arc::new(self.spins),
            history: Arc::new(self.history),
            players: Arc::new(self.players),
            player_admin: Arc::new(self.player_admin),
            admin_auth: Arc::new(self.admin_auth),
            codes: Arc::new(self.codes),
            prizes: Arc::new(self.prizes),
            stats: Arc::new(self.stats),
        }
    }
}
