//! Redeemable spin codes and their lifecycle.
//!
//! A code moves from `active` to `used` at most once. Administrators may move
//! codes between `active` and `disabled`; `expired` is either stored
//! explicitly or implied by a deadline that has passed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::player::PlayerId;

/// Longest code accepted at the boundary, prefix included.
pub const CODE_MAX_LEN: usize = 64;

/// Validation errors raised when constructing code primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeValidationError {
    #[error("code must not be empty")]
    EmptyCode,
    #[error("code must be at most {max} characters")]
    CodeTooLong { max: usize },
    #[error("unknown code status: {0}")]
    UnknownStatus(String),
    #[error("redemption fields must be written together")]
    PartialRedemption,
}

/// Normalised code value: trimmed and upper-cased.
///
/// # Examples
/// ```
/// use spinwheel::domain::CodeValue;
///
/// let code = CodeValue::parse("  test001 ").expect("valid code");
/// assert_eq!(code.as_str(), "TEST001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct CodeValue(String);

impl CodeValue {
    /// Normalise and validate raw caller input.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CodeValidationError> {
        let normalised = raw.as_ref().trim().to_uppercase();
        if normalised.is_empty() {
            return Err(CodeValidationError::EmptyCode);
        }
        if normalised.chars().count() > CODE_MAX_LEN {
            return Err(CodeValidationError::CodeTooLong { max: CODE_MAX_LEN });
        }
        Ok(Self(normalised))
    }

    /// Borrow the normalised value.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CodeValue {
    type Error = CodeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CodeValue> for String {
    fn from(value: CodeValue) -> Self {
        value.0
    }
}

/// Stored lifecycle state of a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CodeStatus {
    Active,
    Used,
    Disabled,
    Expired,
}

impl CodeStatus {
    /// Storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Disabled => "disabled",
            Self::Expired => "expired",
        }
    }
}

impl std::str::FromStr for CodeStatus {
    type Err = CodeValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "used" => Ok(Self::Used),
            "disabled" => Ok(Self::Disabled),
            "expired" => Ok(Self::Expired),
            other => Err(CodeValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Why a code that exists cannot be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CodeRejection {
    Used,
    Disabled,
    Expired,
}

impl CodeRejection {
    /// Stable reason tag carried in error details.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Used => "used",
            Self::Disabled => "disabled",
            Self::Expired => "expired",
        }
    }

    /// Player-facing message.
    pub fn message(self) -> &'static str {
        match self {
            Self::Used => "Code already used",
            Self::Disabled => "Code is disabled",
            Self::Expired => "Code has expired",
        }
    }
}

/// Fields written by the single successful redemption of a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub used_by: Option<PlayerId>,
    pub used_by_username: String,
    pub used_at: DateTime<Utc>,
    pub prize: String,
}

/// A stored spin code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinCode {
    pub id: Uuid,
    pub code: CodeValue,
    pub status: CodeStatus,
    pub note: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub redemption: Option<Redemption>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SpinCode {
    /// Whether the code would accept a redemption at `now`.
    ///
    /// A deadline equal to `now` already counts as expired.
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.diagnose_at(now).is_none()
    }

    /// Classify why the code cannot be redeemed at `now`, if it cannot.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use spinwheel::domain::{CodeRejection, CodeStatus, CodeValue, SpinCode};
    ///
    /// let now = Utc::now();
    /// let mut code = SpinCode::issue(CodeValue::parse("ABC").unwrap(), now);
    /// code.status = CodeStatus::Disabled;
    /// assert_eq!(code.diagnose_at(now), Some(CodeRejection::Disabled));
    /// ```
    pub fn diagnose_at(&self, now: DateTime<Utc>) -> Option<CodeRejection> {
        match self.status {
            CodeStatus::Used => Some(CodeRejection::Used),
            CodeStatus::Disabled => Some(CodeRejection::Disabled),
            CodeStatus::Expired => Some(CodeRejection::Expired),
            CodeStatus::Active if self.is_past_deadline(now) => Some(CodeRejection::Expired),
            CodeStatus::Active => None,
        }
    }

    /// Whether the code has ever been redeemed.
    pub fn has_been_redeemed(&self) -> bool {
        self.status == CodeStatus::Used || self.redemption.is_some()
    }

    /// Fresh active code with no deadline or note.
    pub fn issue(code: CodeValue, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            status: CodeStatus::Active,
            note: None,
            expires_at: None,
            redemption: None,
            created_by: None,
            created_at: now,
        }
    }

    fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Unvalidated redemption columns as persisted.
#[derive(Debug, Clone, Default)]
pub struct RedemptionColumns {
    pub used_by: Option<Uuid>,
    pub used_by_username: Option<String>,
    pub used_at: Option<DateTime<Utc>>,
    pub prize: Option<String>,
}

impl RedemptionColumns {
    /// Collapse the nullable columns into an all-or-nothing redemption.
    ///
    /// `used_by` may be cleared independently when a player is deleted.
    pub fn into_redemption(self) -> Result<Option<Redemption>, CodeValidationError> {
        match (self.used_by_username, self.used_at, self.prize) {
            (None, None, None) => Ok(None),
            (Some(used_by_username), Some(used_at), Some(prize)) => Ok(Some(Redemption {
                used_by: self.used_by.map(PlayerId::from_uuid),
                used_by_username,
                used_at,
                prize,
            })),
            _ => Err(CodeValidationError::PartialRedemption),
        }
    }
}

/// Input for atomically redeeming a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionClaim {
    pub code: CodeValue,
    pub player_id: PlayerId,
    pub username: String,
    pub prize: String,
    pub now: DateTime<Utc>,
}
