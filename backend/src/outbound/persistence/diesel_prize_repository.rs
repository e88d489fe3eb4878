//! PostgreSQL-backed `PrizeRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PrizeRepository, PrizeRepositoryError};
use crate::domain::{Prize, PrizeDraft, PrizePatch, ProbabilityUpdate, assign_orders};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::count_to_u64;
use super::models::{NewPrizeRow, PrizeChangeset, PrizeRow};
use super::pool::{DbPool, PoolError};
use super::schema::prizes;

/// Diesel-backed implementation of the `PrizeRepository` port.
#[derive(Clone)]
pub struct DieselPrizeRepository {
    pool: DbPool,
}

impl DieselPrizeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PrizeRepositoryError {
    map_basic_pool_error(error, PrizeRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PrizeRepositoryError {
    map_basic_diesel_error(
        error,
        PrizeRepositoryError::query,
        PrizeRepositoryError::connection,
    )
}

/// Failure inside the batch probability transaction.
enum BatchFailure {
    Diesel(diesel::result::Error),
    UnknownPrize(Uuid),
}

impl From<diesel::result::Error> for BatchFailure {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

#[async_trait]
impl PrizeRepository for DieselPrizeRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<Prize>, PrizeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut statement = prizes::table.into_boxed();
        if active_only {
            statement = statement.filter(prizes::is_active.eq(true));
        }
        let rows: Vec<PrizeRow> = statement
            .order((prizes::sort_order.asc(), prizes::created_at.asc()))
            .select(PrizeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Prize::from).collect())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Prize>, PrizeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PrizeRow> = prizes::table
            .find(*id)
            .select(PrizeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Prize::from))
    }

    async fn insert(
        &self,
        drafts: &[PrizeDraft],
        now: DateTime<Utc>,
    ) -> Result<Vec<Prize>, PrizeRepositoryError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = conn
            .transaction(|conn| {
                async move {
                    let max_order: Option<i32> = prizes::table
                        .select(diesel::dsl::max(prizes::sort_order))
                        .first(conn)
                        .await?;
                    let orders = assign_orders(drafts, max_order);
                    let new_rows: Vec<NewPrizeRow<'_>> = drafts
                        .iter()
                        .zip(orders)
                        .map(|(draft, sort_order)| NewPrizeRow {
                            id: Uuid::new_v4(),
                            name: draft.name.as_str(),
                            color: draft.color.as_str(),
                            probability: draft.probability,
                            is_active: draft.is_active,
                            sort_order,
                            created_at: now,
                            updated_at: now,
                        })
                        .collect();
                    diesel::insert_into(prizes::table)
                        .values(&new_rows)
                        .returning(PrizeRow::as_returning())
                        .get_results::<PrizeRow>(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Prize::from).collect())
    }

    async fn update(
        &self,
        id: &Uuid,
        patch: &PrizePatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Prize>, PrizeRepositoryError> {
        let changes = PrizeChangeset {
            name: patch.name.as_deref(),
            color: patch.color.as_deref(),
            probability: patch.probability,
            is_active: patch.is_active,
            sort_order: patch.order,
            updated_at: now,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PrizeRow> = diesel::update(prizes::table.find(*id))
            .set(&changes)
            .returning(PrizeRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Prize::from))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, PrizeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(prizes::table.find(*id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn update_probabilities(
        &self,
        updates: &[ProbabilityUpdate],
        now: DateTime<Utc>,
    ) -> Result<(), PrizeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                for update in updates {
                    let touched = diesel::update(prizes::table.find(update.id))
                        .set((
                            prizes::probability.eq(update.probability),
                            prizes::updated_at.eq(now),
                        ))
                        .execute(conn)
                        .await?;
                    if touched == 0 {
                        return Err(BatchFailure::UnknownPrize(update.id));
                    }
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|failure| match failure {
            BatchFailure::Diesel(error) => map_diesel_error(error),
            BatchFailure::UnknownPrize(id) => PrizeRepositoryError::unknown_prize(id),
        })
    }

    async fn count(&self) -> Result<u64, PrizeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = prizes::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(total))
    }
}
