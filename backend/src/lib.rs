//! Spin-the-wheel redemption backend.
//!
//! Players redeem single-use codes for a weighted prize draw; admins manage
//! codes and prizes and watch live counters over WebSocket.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
