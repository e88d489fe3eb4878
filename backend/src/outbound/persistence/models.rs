//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Rows are decoded into validated domain
//! records through the `TryFrom` impls below; a row that fails validation is
//! reported as a query error rather than silently repaired.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    CodeStatus, CodeValidationError, CodeValue, Player, PlayerId, PlayerRole,
    PlayerValidationError, Prize, RedemptionColumns, SpinCode, SpinLog, Username,
};

use super::schema::{players, prizes, spin_codes, spin_logs};

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Row struct for reading from the players table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlayerRow {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PlayerRow> for Player {
    type Error = PlayerValidationError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PlayerId::from_uuid(row.id),
            username: Username::new(row.username)?,
            role: row.role.parse::<PlayerRole>()?,
            is_blocked: row.is_blocked,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for registering players.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = players)]
pub(crate) struct NewPlayerRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub role: &'a str,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Player> for NewPlayerRow<'a> {
    fn from(player: &'a Player) -> Self {
        Self {
            id: *player.id.as_uuid(),
            username: player.username.as_str(),
            role: player.role.as_str(),
            is_blocked: player.is_blocked,
            created_at: player.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Spin codes
// ---------------------------------------------------------------------------

/// Row struct for reading from the spin_codes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = spin_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SpinCodeRow {
    pub id: Uuid,
    pub code: String,
    pub status: String,
    pub note: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub used_by: Option<Uuid>,
    pub used_by_username: Option<String>,
    pub used_at: Option<DateTime<Utc>>,
    pub prize: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SpinCodeRow> for SpinCode {
    type Error = CodeValidationError;

    fn try_from(row: SpinCodeRow) -> Result<Self, Self::Error> {
        let redemption = RedemptionColumns {
            used_by: row.used_by,
            used_by_username: row.used_by_username,
            used_at: row.used_at,
            prize: row.prize,
        }
        .into_redemption()?;
        Ok(Self {
            id: row.id,
            code: CodeValue::parse(row.code)?,
            status: row.status.parse::<CodeStatus>()?,
            note: row.note,
            expires_at: row.expires_at,
            redemption,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for freshly issued codes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = spin_codes)]
pub(crate) struct NewSpinCodeRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub status: &'a str,
    pub note: Option<&'a str>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a SpinCode> for NewSpinCodeRow<'a> {
    fn from(code: &'a SpinCode) -> Self {
        Self {
            id: code.id,
            code: code.code.as_str(),
            status: code.status.as_str(),
            note: code.note.as_deref(),
            expires_at: code.expires_at,
            created_by: code.created_by.as_deref(),
            created_at: code.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Prizes
// ---------------------------------------------------------------------------

/// Row struct for reading from the prizes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prizes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PrizeRow {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub probability: f64,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PrizeRow> for Prize {
    fn from(row: PrizeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
            probability: row.probability,
            is_active: row.is_active,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for new prizes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = prizes)]
pub(crate) struct NewPrizeRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub color: &'a str,
    pub probability: f64,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for partial prize updates; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = prizes)]
pub(crate) struct PrizeChangeset<'a> {
    pub name: Option<&'a str>,
    pub color: Option<&'a str>,
    pub probability: Option<f64>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Spin logs
// ---------------------------------------------------------------------------

/// Row struct for reading from the spin_logs table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = spin_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SpinLogRow {
    pub id: Uuid,
    pub code: String,
    pub prize: String,
    pub player_id: Option<Uuid>,
    pub username: String,
    pub spun_at: DateTime<Utc>,
}

impl From<SpinLogRow> for SpinLog {
    fn from(row: SpinLogRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            prize: row.prize,
            player_id: row.player_id.map(PlayerId::from_uuid),
            username: row.username,
            timestamp: row.spun_at,
        }
    }
}

/// Insertable struct for appending spin logs.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = spin_logs)]
pub(crate) struct NewSpinLogRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub prize: &'a str,
    pub player_id: Option<Uuid>,
    pub username: &'a str,
    pub spun_at: DateTime<Utc>,
}
