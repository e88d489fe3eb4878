//! Application settings loaded via OrthoConfig.
//!
//! Values come from `SPINWHEEL_*` environment variables, an optional
//! configuration file, and command-line flags, in increasing precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{AdminCredentials, HISTORY_LIMIT};
use crate::inbound::http::session_config::BuildMode;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEBUG_ADMIN_PASSWORD: &str = "admin";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    #[error("SPINWHEEL_ADMIN_PASSWORD must be set in release builds")]
    MissingAdminPassword,
    #[error("invalid admin credentials: {0}")]
    AdminCredentials(String),
}

/// Runtime configuration for the server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SPINWHEEL")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub db_pool_size: Option<u32>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    /// Origins allowed to open live connections. A comma-separated
    /// environment value yields several entries; layers are concatenated.
    #[serde(default)]
    #[ortho_config(default = vec![], merge_strategy = "append")]
    pub ws_allowed_origins: Vec<String>,
    /// Admit `http://localhost:<port>` origins on live connections.
    #[ortho_config(default = false)]
    pub ws_allow_localhost: bool,
    /// Entries returned by the per-player history endpoint.
    pub history_limit: Option<u32>,
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE).max(1)
    }

    pub fn history_limit(&self) -> u32 {
        self.history_limit.unwrap_or(HISTORY_LIMIT).max(1)
    }

    /// Configured origin allow-list entries.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.ws_allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Admin credential pair.
    ///
    /// Debug builds fall back to `admin`/`admin` with a warning when no
    /// password is configured; release builds refuse to start.
    pub fn admin_credentials(&self, mode: BuildMode) -> Result<AdminCredentials, SettingsError> {
        let username = self
            .admin_username
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_USERNAME);
        let password = match (self.admin_password.as_deref(), mode) {
            (Some(password), _) => password,
            (None, BuildMode::Debug) => {
                warn!("SPINWHEEL_ADMIN_PASSWORD not set; using the development password");
                DEBUG_ADMIN_PASSWORD
            }
            (None, BuildMode::Release) => return Err(SettingsError::MissingAdminPassword),
        };
        AdminCredentials::try_from_parts(username, password)
            .map_err(|err| SettingsError::AdminCredentials(err.to_string()))
    }
}
