//! Port for player persistence.

use async_trait::async_trait;

use crate::domain::{Player, PlayerId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by player repository adapters.
    pub enum PlayerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "player repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "player repository query failed: {message}",
        /// Another player already holds the username, ignoring case.
        DuplicateUsername { username: String } => "username already taken: {username}",
    }
}

/// Port for reading, registering and blocking players.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Resolve a username ignoring case.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Player>, PlayerRepositoryError>;

    /// Resolve a player by identifier.
    async fn find_by_id(&self, id: &PlayerId) -> Result<Option<Player>, PlayerRepositoryError>;

    /// Store a new player.
    async fn insert(&self, player: &Player) -> Result<(), PlayerRepositoryError>;

    /// Number of players with the `user` role.
    async fn count_regular(&self) -> Result<u64, PlayerRepositoryError>;

    /// Players with the `user` role, newest first.
    async fn list_regular(&self) -> Result<Vec<Player>, PlayerRepositoryError>;

    /// Set the blocked flag, returning the updated player or `None` when the
    /// identifier is unknown.
    async fn set_blocked(
        &self,
        id: &PlayerId,
        blocked: bool,
    ) -> Result<Option<Player>, PlayerRepositoryError>;
}
