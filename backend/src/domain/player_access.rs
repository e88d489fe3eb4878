//! Passwordless player sign-in and sign-out.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::ports::{PlayerAccess, PlayerRepository, PlayerRepositoryError, SignInOutcome};
use super::repository_errors::map_player_error;
use super::{Error, LiveEvent, LiveStatsBroadcaster, Player, PlayerId, PlayerValidationError, Username};

/// Player session service implementing [`PlayerAccess`].
#[derive(Clone)]
pub struct PlayerAccessService {
    players: Arc<dyn PlayerRepository>,
    broadcaster: LiveStatsBroadcaster,
    clock: Arc<dyn Clock>,
}

impl PlayerAccessService {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        broadcaster: LiveStatsBroadcaster,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            players,
            broadcaster,
            clock,
        }
    }

    /// Register the player, tolerating a concurrent registration of the same name.
    async fn register(&self, username: Username) -> Result<SignInOutcome, Error> {
        let player = Player::register(username, self.clock.utc());
        match self.players.insert(&player).await {
            Ok(()) => Ok(SignInOutcome {
                player,
                created: true,
            }),
            Err(PlayerRepositoryError::DuplicateUsername { .. }) => {
                let existing = self
                    .players
                    .find_by_username(&player.username)
                    .await
                    .map_err(map_player_error)?
                    .ok_or_else(|| Error::internal("player vanished after conflict"))?;
                Ok(SignInOutcome {
                    player: existing,
                    created: false,
                })
            }
            Err(err) => Err(map_player_error(err)),
        }
    }
}

#[async_trait]
impl PlayerAccess for PlayerAccessService {
    async fn sign_in(&self, username: &str) -> Result<SignInOutcome, Error> {
        let username = Username::new(username).map_err(|err| match err {
            PlayerValidationError::EmptyUsername => Error::invalid_request("Username is required"),
            other => Error::invalid_request(other.to_string()),
        })?;
        let outcome = match self
            .players
            .find_by_username(&username)
            .await
            .map_err(map_player_error)?
        {
            Some(player) => SignInOutcome {
                player,
                created: false,
            },
            None => self.register(username).await?,
        };
        let player = &outcome.player;
        if player.is_blocked {
            return Err(Error::forbidden("Account is blocked"));
        }

        if outcome.created {
            info!(player = %player.id, username = %player.username, "player registered");
            self.broadcaster
                .publish_admin(LiveEvent::PlayerCreated(player.clone()));
        }
        info!(player = %player.id, "player signed in");
        self.broadcaster.publish_admin(LiveEvent::PlayerLoggedIn {
            id: player.id,
            username: player.username.clone(),
        });
        self.broadcaster.broadcast_kpis().await;
        Ok(outcome)
    }

    async fn sign_out(&self, id: &PlayerId) -> Result<(), Error> {
        let player = self
            .players
            .find_by_id(id)
            .await
            .map_err(map_player_error)?;
        if let Some(player) = player {
            info!(player = %player.id, "player signed out");
            self.broadcaster.publish_admin(LiveEvent::PlayerLoggedOut {
                id: player.id,
                username: player.username,
            });
        }
        self.broadcaster.broadcast_kpis().await;
        Ok(())
    }
}
