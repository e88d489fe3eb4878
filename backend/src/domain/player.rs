//! Player identity.
//!
//! Players are the end users who redeem codes. Usernames are unique ignoring
//! case; lookups go through [`Username::lookup_key`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Longest username accepted at the boundary.
pub const USERNAME_MAX: usize = 64;

/// Validation errors raised when constructing player primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    #[error("unknown player role: {0}")]
    UnknownRole(String),
}

/// Stable player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, non-empty username preserving the caller's casing.
///
/// # Examples
/// ```
/// use spinwheel::domain::Username;
///
/// let name = Username::new("  Alice ").expect("valid username");
/// assert_eq!(name.as_ref(), "Alice");
/// assert_eq!(name.lookup_key(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PlayerValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PlayerValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(PlayerValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-folded form used for uniqueness checks and lookups.
    pub fn lookup_key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Borrow the username as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = PlayerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Role attached to a player record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    User,
    Admin,
}

impl PlayerRole {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for PlayerRole {
    type Err = PlayerValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(PlayerValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// A known end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub username: Username,
    pub role: PlayerRole,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Build a new, unblocked player with the `user` role.
    pub fn register(username: Username, now: DateTime<Utc>) -> Self {
        Self {
            id: PlayerId::random(),
            username,
            role: PlayerRole::User,
            is_blocked: false,
            created_at: now,
        }
    }

    /// Whether the player counts towards the `totalUsers` KPI.
    pub fn is_regular(&self) -> bool {
        self.role == PlayerRole::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice", "alice")]
    #[case("  Bob  ", "Bob")]
    #[case("\tCarol\n", "Carol")]
    fn username_is_trimmed(#[case] raw: &str, #[case] expected: &str) {
        let name = Username::new(raw).expect("valid username");
        assert_eq!(name.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_usernames_are_rejected(#[case] raw: &str) {
        assert_eq!(
            Username::new(raw),
            Err(PlayerValidationError::EmptyUsername)
        );
    }

    #[rstest]
    fn overlong_usernames_are_rejected() {
        let raw = "x".repeat(USERNAME_MAX + 1);
        assert!(matches!(
            Username::new(raw),
            Err(PlayerValidationError::UsernameTooLong { .. })
        ));
    }

    #[rstest]
    fn lookup_key_ignores_case() {
        let upper = Username::new("ALICE").expect("valid");
        let mixed = Username::new("aLiCe").expect("valid");
        assert_eq!(upper.lookup_key(), mixed.lookup_key());
    }

    #[rstest]
    #[case("user", PlayerRole::User)]
    #[case("admin", PlayerRole::Admin)]
    fn roles_parse_from_storage(#[case] raw: &str, #[case] expected: PlayerRole) {
        assert_eq!(raw.parse::<PlayerRole>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn unknown_roles_are_rejected() {
        assert!("owner".parse::<PlayerRole>().is_err());
    }
}
