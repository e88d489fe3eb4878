//! Backend entry-point: loads settings, prepares storage, and runs the server.

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use spinwheel::inbound::http::health::HealthState;
use spinwheel::inbound::http::session_config::fingerprint::key_fingerprint;
use spinwheel::inbound::http::session_config::{BuildMode, session_settings_from_env};
use spinwheel::inbound::ws::origin::OriginPolicy;
use spinwheel::outbound::persistence::{DbPool, PoolConfig, apply_pending_migrations};
use spinwheel::server::state_builders::{MEMORY_STORAGE, POSTGRES_STORAGE};
use spinwheel::server::{AppSettings, ServerConfig, ServiceOptions, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let mode = BuildMode::from_debug_assertions();
    let settings = AppSettings::load().map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let session =
        session_settings_from_env(&DefaultEnv::new(), mode).map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let origins = OriginPolicy::new(settings.allowed_origins(), settings.ws_allow_localhost)
        .map_err(std::io::Error::other)?;
    if origins.is_empty() {
        warn!("no WebSocket origins configured; live connections will be refused");
    }
    let admin = settings
        .admin_credentials(mode)
        .map_err(std::io::Error::other)?;
    let services = ServiceOptions::new(admin)
        .with_history_limit(settings.history_limit())
        .with_origins(origins);

    let mut config = ServerConfig::new(session, bind_addr, services);
    let storage = match settings.database_url() {
        Some(url) => {
            apply_pending_migrations(url)
                .await
                .map_err(std::io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_pool_size()))
                .await
                .map_err(std::io::Error::other)?;
            let status = pool.status();
            info!(
                connections = status.connections,
                idle = status.idle,
                "database pool ready"
            );
            config = config.with_db_pool(pool);
            POSTGRES_STORAGE
        }
        None => {
            warn!("SPINWHEEL_DATABASE_URL not set; using the in-memory store");
            MEMORY_STORAGE
        }
    };

    let health_state = web::Data::new(HealthState::new(storage));
    info!(%bind_addr, storage, "starting server");
    create_server(health_state, config)?.await
}
