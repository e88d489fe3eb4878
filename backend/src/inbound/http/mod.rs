//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod codes;
pub mod error;
pub mod game;
pub mod health;
pub mod prizes;
pub mod session;
pub mod session_config;
pub mod state;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
