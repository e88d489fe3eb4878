//! Driving port used by live connections.

use async_trait::async_trait;

use crate::domain::{ConnectionId, Error, KpiSnapshot, PlayerId};

/// Domain use-case port for live connection bookkeeping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LivePresence: Send + Sync {
    /// A player opened a live connection.
    async fn connected(&self, player: PlayerId, connection: ConnectionId);

    /// A player's live connection closed.
    async fn disconnected(&self, player: PlayerId, connection: ConnectionId);

    /// Current dashboard counters, sent to newly connected admins.
    async fn snapshot(&self) -> Result<KpiSnapshot, Error>;
}
