//! PostgreSQL-backed `SpinLogRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{SpinLogRepository, SpinLogRepositoryError};
use crate::domain::{NewSpinLog, Page, SpinLog, SpinLogQuery};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{contains_pattern, count_to_u64, lower, page_bounds};
use super::models::{NewSpinLogRow, SpinLogRow};
use super::pool::{DbPool, PoolError};
use super::schema::spin_logs;

/// Diesel-backed implementation of the `SpinLogRepository` port.
#[derive(Clone)]
pub struct DieselSpinLogRepository {
    pool: DbPool,
}

impl DieselSpinLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SpinLogRepositoryError {
    map_basic_pool_error(error, SpinLogRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SpinLogRepositoryError {
    map_basic_diesel_error(
        error,
        SpinLogRepositoryError::query,
        SpinLogRepositoryError::connection,
    )
}

fn filtered(query: &SpinLogQuery) -> spin_logs::BoxedQuery<'static, Pg> {
    let mut statement = spin_logs::table.into_boxed();
    if let Some(from) = query.window.from {
        statement = statement.filter(spin_logs::spun_at.ge(from));
    }
    if let Some(until) = query.window.until {
        statement = statement.filter(spin_logs::spun_at.lt(until));
    }
    if let Some(term) = query.search.as_deref() {
        let code_pattern = contains_pattern(&term.to_uppercase());
        let name_pattern = contains_pattern(&term.to_lowercase());
        statement = statement.filter(
            spin_logs::code
                .like(code_pattern)
                .or(lower(spin_logs::username).like(name_pattern)),
        );
    }
    statement
}

#[async_trait]
impl SpinLogRepository for DieselSpinLogRepository {
    async fn append(&self, entry: &NewSpinLog) -> Result<SpinLog, SpinLogRepositoryError> {
        let row = NewSpinLogRow {
            id: Uuid::new_v4(),
            code: entry.code.as_str(),
            prize: entry.prize.as_str(),
            player_id: Some(*entry.player_id.as_uuid()),
            username: entry.username.as_str(),
            spun_at: entry.timestamp,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: SpinLogRow = diesel::insert_into(spin_logs::table)
            .values(&row)
            .returning(SpinLogRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(SpinLog::from(stored))
    }

    async fn history_for(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<SpinLog>, SpinLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SpinLogRow> = spin_logs::table
            .filter(lower(spin_logs::username).eq(username.to_lowercase()))
            .order(spin_logs::spun_at.desc())
            .limit(i64::from(limit))
            .select(SpinLogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(SpinLog::from).collect())
    }

    async fn list(&self, query: &SpinLogQuery) -> Result<Page<SpinLog>, SpinLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (offset, limit) = page_bounds(query.page);
        let rows: Vec<SpinLogRow> = filtered(query)
            .order(spin_logs::spun_at.desc())
            .offset(offset)
            .limit(limit)
            .select(SpinLogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(
            rows.into_iter().map(SpinLog::from).collect(),
            count_to_u64(total),
            query.page,
        ))
    }

    async fn count(&self) -> Result<u64, SpinLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = spin_logs::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(total))
    }
}
