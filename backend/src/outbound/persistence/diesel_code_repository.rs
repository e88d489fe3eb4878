//! PostgreSQL-backed `CodeRepository` implementation using Diesel ORM.
//!
//! Redemption is a single conditional `UPDATE`: PostgreSQL row locking makes
//! the status check and the write atomic, so at most one concurrent claim on
//! a code affects a row.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CodeListQuery, CodeRepository, CodeRepositoryError};
use crate::domain::{CodeStatus, CodeValue, Page, RedemptionClaim, SpinCode};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{contains_pattern, count_to_u64, page_bounds};
use super::models::{NewSpinCodeRow, SpinCodeRow};
use super::pool::{DbPool, PoolError};
use super::schema::spin_codes;

/// Diesel-backed implementation of the `CodeRepository` port.
#[derive(Clone)]
pub struct DieselCodeRepository {
    pool: DbPool,
}

impl DieselCodeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CodeRepositoryError {
    map_basic_pool_error(error, CodeRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CodeRepositoryError {
    map_basic_diesel_error(
        error,
        CodeRepositoryError::query,
        CodeRepositoryError::connection,
    )
}

fn decode(row: SpinCodeRow) -> Result<SpinCode, CodeRepositoryError> {
    let id = row.id;
    SpinCode::try_from(row).map_err(|err| {
        tracing::warn!(code_id = %id, error = %err, "stored code failed validation");
        CodeRepositoryError::query(format!("invalid code row {id}: {err}"))
    })
}

fn decode_all(rows: Vec<SpinCodeRow>) -> Result<Vec<SpinCode>, CodeRepositoryError> {
    rows.into_iter().map(decode).collect()
}

fn filtered(query: &CodeListQuery) -> spin_codes::BoxedQuery<'static, Pg> {
    let mut statement = spin_codes::table.into_boxed();
    if let Some(status) = query.status {
        statement = statement.filter(spin_codes::status.eq(status.as_str()));
    }
    if let Some(term) = query.search.as_deref() {
        let pattern = contains_pattern(&term.trim().to_uppercase());
        statement = statement.filter(spin_codes::code.like(pattern));
    }
    statement
}

#[async_trait]
impl CodeRepository for DieselCodeRepository {
    async fn claim(&self, claim: &RedemptionClaim) -> Result<bool, CodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            spin_codes::table
                .filter(spin_codes::code.eq(claim.code.as_str()))
                .filter(spin_codes::status.eq(CodeStatus::Active.as_str()))
                .filter(
                    spin_codes::expires_at
                        .is_null()
                        .or(spin_codes::expires_at.gt(claim.now)),
                ),
        )
        .set((
            spin_codes::status.eq(CodeStatus::Used.as_str()),
            spin_codes::used_by.eq(Some(*claim.player_id.as_uuid())),
            spin_codes::used_by_username.eq(Some(claim.username.as_str())),
            spin_codes::used_at.eq(Some(claim.now)),
            spin_codes::prize.eq(Some(claim.prize.as_str())),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }

    async fn find_by_code(
        &self,
        code: &CodeValue,
    ) -> Result<Option<SpinCode>, CodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        spin_codes::table
            .filter(spin_codes::code.eq(code.as_str()))
            .select(SpinCodeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SpinCode>, CodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        spin_codes::table
            .find(*id)
            .select(SpinCodeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn insert_batch(&self, codes: &[SpinCode]) -> Result<Vec<SpinCode>, CodeRepositoryError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<NewSpinCodeRow<'_>> = codes.iter().map(NewSpinCodeRow::from).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: Vec<SpinCodeRow> = diesel::insert_into(spin_codes::table)
            .values(&rows)
            .on_conflict(spin_codes::code)
            .do_nothing()
            .returning(SpinCodeRow::as_returning())
            .get_results(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_all(stored)
    }

    async fn list(&self, query: &CodeListQuery) -> Result<Page<SpinCode>, CodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (offset, limit) = page_bounds(query.page);
        let rows: Vec<SpinCodeRow> = filtered(query)
            .order((spin_codes::created_at.desc(), spin_codes::code.asc()))
            .offset(offset)
            .limit(limit)
            .select(SpinCodeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Page::new(decode_all(rows)?, count_to_u64(total), query.page))
    }

    async fn set_status(
        &self,
        id: &Uuid,
        status: CodeStatus,
    ) -> Result<Option<SpinCode>, CodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(spin_codes::table.find(*id))
            .set(spin_codes::status.eq(status.as_str()))
            .returning(SpinCodeRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn reactivate(&self, id: &Uuid) -> Result<Option<SpinCode>, CodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            spin_codes::table
                .find(*id)
                .filter(spin_codes::status.ne(CodeStatus::Used.as_str()))
                .filter(spin_codes::used_at.is_null()),
        )
        .set(spin_codes::status.eq(CodeStatus::Active.as_str()))
        .returning(SpinCodeRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .map(decode)
        .transpose()
    }

    async fn count(&self, status: Option<CodeStatus>) -> Result<u64, CodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut statement = spin_codes::table.into_boxed();
        if let Some(status) = status {
            statement = statement.filter(spin_codes::status.eq(status.as_str()));
        }
        let total: i64 = statement
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count_to_u64(total))
    }

    async fn recent_redemptions(&self, limit: u32) -> Result<Vec<SpinCode>, CodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SpinCodeRow> = spin_codes::table
            .filter(spin_codes::status.eq(CodeStatus::Used.as_str()))
            .filter(spin_codes::used_at.is_not_null())
            .order(spin_codes::used_at.desc())
            .limit(i64::from(limit))
            .select(SpinCodeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        decode_all(rows)
    }
}
