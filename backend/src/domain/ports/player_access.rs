//! Driving port for passwordless player sign-in.

use async_trait::async_trait;

use crate::domain::{Error, Player, PlayerId};

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOutcome {
    pub player: Player,
    /// Whether the player record was created by this sign-in.
    pub created: bool,
}

/// Domain use-case port for player sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerAccess: Send + Sync {
    /// Find the player ignoring case, registering them when unknown.
    async fn sign_in(&self, username: &str) -> Result<SignInOutcome, Error>;

    /// Record that the player ended their session.
    async fn sign_out(&self, id: &PlayerId) -> Result<(), Error>;
}
