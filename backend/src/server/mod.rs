//! Server construction and middleware wiring.

mod config;
pub mod settings;
pub mod state_builders;

pub use config::ServerConfig;
pub use settings::{AppSettings, SettingsError};
pub use state_builders::{AdapterStates, Repositories, ServiceOptions, build_states};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::auth::{
    admin_login, admin_logout, admin_me, player_login, player_logout,
};
use crate::inbound::http::codes::{
    disable_code, enable_code, generate_codes, list_codes, list_logs,
};
use crate::inbound::http::error::configure_extractors;
use crate::inbound::http::game::{history, spin};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::prizes::{
    create_prize, default_prizes, delete_prize, list_active_prizes, list_prizes, public_prizes,
    seed_prizes, update_prize, update_probabilities,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::stats::stats;
use crate::inbound::http::users::{get_player, list_players, toggle_player_block};
use crate::inbound::ws::state::WsState;
use crate::inbound::ws::{admin_ws_entry, ws_entry};
use crate::outbound::events::BroadcastHub;

/// Everything one application instance needs.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub ws_state: web::Data<WsState>,
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Session middleware storing the player and admin identities in one
/// private cookie that lives for two hours.
fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build()
}

/// Assemble the application: REST under `/api`, the live channels,
/// probes, and Swagger UI in debug builds.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let api = web::scope("/api")
        .configure(configure_extractors)
        .service(player_login)
        .service(player_logout)
        .service(spin)
        .service(history)
        .service(public_prizes)
        .service(default_prizes)
        .service(admin_login)
        .service(admin_logout)
        .service(admin_me)
        .service(generate_codes)
        .service(list_logs)
        .service(list_codes)
        .service(disable_code)
        .service(enable_code)
        .service(list_prizes)
        .service(list_active_prizes)
        .service(create_prize)
        .service(update_probabilities)
        .service(seed_prizes)
        .service(update_prize)
        .service(delete_prize)
        .service(stats)
        .service(list_players)
        .service(get_player)
        .service(toggle_player_block);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(session_middleware(key, cookie_secure, same_site))
        .wrap(Trace)
        .service(api)
        .service(ws_entry)
        .service(admin_ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Repositories are backed by PostgreSQL when the configuration carries a
/// pool and by a fresh in-memory store otherwise.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool,
        services,
    } = config;
    let repos = Repositories::from_pool(db_pool.as_ref());
    let AdapterStates { http, ws } =
        build_states(&repos, Arc::new(BroadcastHub::default()), services);
    let http_state = web::Data::new(http);
    let ws_state = web::Data::new(ws);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
