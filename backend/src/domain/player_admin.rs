//! Admin player listing and blocking.
//!
//! A blocked player can neither sign in nor spin. Blocking is a toggle; the
//! dashboard learns about each change through a `user:update` event followed
//! by a KPI refresh.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::ports::{PlayerAdministration, PlayerRepository};
use super::repository_errors::map_player_error;
use super::{Error, LiveEvent, LiveStatsBroadcaster, Player, PlayerId};

/// Player management service implementing [`PlayerAdministration`].
#[derive(Clone)]
pub struct PlayerAdminService {
    players: Arc<dyn PlayerRepository>,
    broadcaster: LiveStatsBroadcaster,
}

impl PlayerAdminService {
    pub fn new(players: Arc<dyn PlayerRepository>, broadcaster: LiveStatsBroadcaster) -> Self {
        Self {
            players,
            broadcaster,
        }
    }
}

fn player_not_found() -> Error {
    Error::not_found("User not found")
}

#[async_trait]
impl PlayerAdministration for PlayerAdminService {
    async fn list(&self) -> Result<Vec<Player>, Error> {
        self.players.list_regular().await.map_err(map_player_error)
    }

    async fn get(&self, id: &PlayerId) -> Result<Player, Error> {
        self.players
            .find_by_id(id)
            .await
            .map_err(map_player_error)?
            .ok_or_else(player_not_found)
    }

    async fn toggle_block(&self, id: &PlayerId) -> Result<Player, Error> {
        let current = self.get(id).await?;
        if !current.is_regular() {
            return Err(Error::invalid_request("Cannot block admin"));
        }
        let updated = self
            .players
            .set_blocked(id, !current.is_blocked)
            .await
            .map_err(map_player_error)?
            .ok_or_else(player_not_found)?;
        info!(player = %updated.id, blocked = updated.is_blocked, "player block toggled");
        self.broadcaster.publish_admin(LiveEvent::PlayerUpdated {
            id: updated.id,
            is_blocked: updated.is_blocked,
        });
        self.broadcaster.broadcast_kpis().await;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockEventPublisher, MockPlayerRepository};
    use crate::domain::test_support::{player, quiet_broadcaster};
    use crate::domain::{ErrorCode, PlayerRole};
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Mutex;

    fn service(players: MockPlayerRepository, publisher: MockEventPublisher) -> PlayerAdminService {
        PlayerAdminService::new(Arc::new(players), quiet_broadcaster(Arc::new(publisher)))
    }

    #[rstest]
    #[case(false, true)]
    #[case(true, false)]
    #[tokio::test]
    async fn toggle_flips_the_flag_and_notifies_admins(
        #[case] was_blocked: bool,
        #[case] now_blocked: bool,
    ) {
        let mut alice = player("alice");
        alice.is_blocked = was_blocked;
        let id = alice.id;
        let stored = alice.clone();
        let mut players = MockPlayerRepository::new();
        players
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        players
            .expect_set_blocked()
            .withf(move |target, blocked| *target == id && *blocked == now_blocked)
            .times(1)
            .returning(move |_, blocked| {
                let mut updated = alice.clone();
                updated.is_blocked = blocked;
                Ok(Some(updated))
            });
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&events);
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().returning(move |_, event| {
            recorded
                .lock()
                .expect("events lock")
                .push((event.name(), event.payload().expect("payload")));
            Ok(1)
        });

        let updated = service(players, publisher)
            .toggle_block(&id)
            .await
            .expect("toggled");
        assert_eq!(updated.is_blocked, now_blocked);
        let events = events.lock().expect("events lock");
        assert_eq!(events[0].0, "user:update");
        assert_eq!(events[0].1, json!({"id": id, "isBlocked": now_blocked}));
        assert_eq!(events[1].0, "kpi:update");
    }

    #[rstest]
    #[tokio::test]
    async fn admins_cannot_be_blocked() {
        let mut root = player("root");
        root.role = PlayerRole::Admin;
        let id = root.id;
        let mut players = MockPlayerRepository::new();
        players
            .expect_find_by_id()
            .returning(move |_| Ok(Some(root.clone())));
        players.expect_set_blocked().times(0);

        let err = service(players, MockEventPublisher::new())
            .toggle_block(&id)
            .await
            .expect_err("admin");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Cannot block admin");
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_player_is_not_found() {
        let mut players = MockPlayerRepository::new();
        players.expect_find_by_id().returning(|_| Ok(None));

        let subject = service(players, MockEventPublisher::new());
        let id = PlayerId::random();
        for err in [
            subject.get(&id).await.expect_err("missing"),
            subject.toggle_block(&id).await.expect_err("missing"),
        ] {
            assert_eq!(err.code(), ErrorCode::NotFound);
            assert_eq!(err.message(), "User not found");
        }
    }

    #[rstest]
    #[tokio::test]
    async fn list_returns_regular_players() {
        let listed = vec![player("bob"), player("alice")];
        let expected = listed.clone();
        let mut players = MockPlayerRepository::new();
        players
            .expect_list_regular()
            .returning(move || Ok(listed.clone()));

        let result = service(players, MockEventPublisher::new())
            .list()
            .await
            .expect("listed");
        assert_eq!(result, expected);
    }
}
