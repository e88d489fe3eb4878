//! PostgreSQL-backed `PlayerRepository` implementation using Diesel ORM.
//!
//! Username uniqueness is enforced by a unique index on `lower(username)`;
//! a violation on insert is reported as `DuplicateUsername` so the caller can
//! re-read the winning registration.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PlayerRepository, PlayerRepositoryError};
use crate::domain::{Player, PlayerId, PlayerRole, Username};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{count_to_u64, lower};
use super::models::{NewPlayerRow, PlayerRow};
use super::pool::{DbPool, PoolError};
use super::schema::players;

/// Diesel-backed implementation of the `PlayerRepository` port.
#[derive(Clone)]
pub struct DieselPlayerRepository {
    pool: DbPool,
}

impl DieselPlayerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PlayerRepositoryError {
    map_basic_pool_error(error, PlayerRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PlayerRepositoryError {
    map_basic_diesel_error(
        error,
        PlayerRepositoryError::query,
        PlayerRepositoryError::connection,
    )
}

fn decode(row: PlayerRow) -> Result<Player, PlayerRepositoryError> {
    let id = row.id;
    Player::try_from(row).map_err(|err| {
        tracing::warn!(player_id = %id, error = %err, "stored player failed validation");
        PlayerRepositoryError::query(format!("invalid player row {id}: {err}"))
    })
}

#[async_trait]
impl PlayerRepository for DieselPlayerRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Player>, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        players::table
            .filter(lower(players::username).eq(username.lookup_key()))
            .select(PlayerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn find_by_id(&self, id: &PlayerId) -> Result<Option<Player>, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        players::table
            .find(*id.as_uuid())
            .select(PlayerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn insert(&self, player: &Player) -> Result<(), PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(players::table)
            .values(NewPlayerRow::from(player))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    PlayerRepositoryError::duplicate_username(player.username.as_str())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn count_regular(&self) -> Result<u64, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = players::table
            .filter(players::role.eq(PlayerRole::User.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(total))
    }

    async fn list_regular(&self) -> Result<Vec<Player>, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        players::table
            .filter(players::role.eq(PlayerRole::User.as_str()))
            .order(players::created_at.desc())
            .select(PlayerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(decode)
            .collect()
    }

    async fn set_blocked(
        &self,
        id: &PlayerId,
        blocked: bool,
    ) -> Result<Option<Player>, PlayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(players::table.find(*id.as_uuid()))
            .set(players::is_blocked.eq(blocked))
            .returning(PlayerRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }
}
