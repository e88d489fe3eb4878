//! Driving port for admin player management.

use async_trait::async_trait;

use crate::domain::{Error, Player, PlayerId};

/// Domain use-case port for listing and blocking players.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerAdministration: Send + Sync {
    /// Regular players, newest first.
    async fn list(&self) -> Result<Vec<Player>, Error>;

    /// One player; `not_found` when unknown.
    async fn get(&self, id: &PlayerId) -> Result<Player, Error>;

    /// Flip the player's blocked flag and return the updated record.
    ///
    /// Admin records cannot be blocked.
    async fn toggle_block(&self, id: &PlayerId) -> Result<Player, Error>;
}
