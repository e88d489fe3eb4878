//! Administrator authentication.
//!
//! Admin accounts are not stored alongside players: the operator configures a
//! single credential pair and [`ConfiguredAdminAuthenticator`] checks logins
//! against it.

use std::fmt;

use async_trait::async_trait;
use tracing::warn;
use zeroize::Zeroizing;

use super::Error;
use super::ports::AdminAuthenticator;

/// Domain error returned when admin login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminLoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for AdminLoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for AdminLoginValidationError {}

/// Validated admin login credentials.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use spinwheel::domain::AdminCredentials;
///
/// let creds = AdminCredentials::try_from_parts(" admin ", "s3cret").unwrap();
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl AdminCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, AdminLoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(AdminLoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(AdminLoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    username: String,
}

impl AdminIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }
}

/// Checks admin logins against one configured credential pair.
#[derive(Clone)]
pub struct ConfiguredAdminAuthenticator {
    credentials: AdminCredentials,
}

impl ConfiguredAdminAuthenticator {
    pub fn new(credentials: AdminCredentials) -> Self {
        Self { credentials }
    }
}

impl fmt::Debug for ConfiguredAdminAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredAdminAuthenticator")
            .field("username", &self.credentials.username())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AdminAuthenticator for ConfiguredAdminAuthenticator {
    async fn authenticate(&self, credentials: &AdminCredentials) -> Result<AdminIdentity, Error> {
        let username_ok = credentials.username() == self.credentials.username();
        let password_ok = credentials.password() == self.credentials.password();
        if username_ok && password_ok {
            Ok(AdminIdentity::new(credentials.username()))
        } else {
            warn!(username = credentials.username(), "admin login rejected");
            Err(Error::unauthorized("Invalid credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn authenticator() -> ConfiguredAdminAuthenticator {
        ConfiguredAdminAuthenticator::new(
            AdminCredentials::try_from_parts("admin", "s3cret").expect("valid credentials"),
        )
    }

    #[rstest]
    #[case("", "pw", AdminLoginValidationError::EmptyUsername)]
    #[case("   ", "pw", AdminLoginValidationError::EmptyUsername)]
    #[case("admin", "", AdminLoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: AdminLoginValidationError,
    ) {
        let err = AdminCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("admin", "s3cret", true)]
    #[case("  admin ", "s3cret", true)]
    #[case("admin", "wrong", false)]
    #[case("root", "s3cret", false)]
    #[tokio::test]
    async fn configured_authenticator_checks_both_fields(
        authenticator: ConfiguredAdminAuthenticator,
        #[case] username: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let creds = AdminCredentials::try_from_parts(username, password).expect("shape");
        match (should_succeed, authenticator.authenticate(&creds).await) {
            (true, Ok(identity)) => assert_eq!(identity.username(), "admin"),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(identity)) => panic!("expected failure, got {identity:?}"),
        }
    }

    #[rstest]
    fn debug_output_hides_password(authenticator: ConfiguredAdminAuthenticator) {
        let rendered = format!("{authenticator:?}");
        assert!(!rendered.contains("s3cret"));
    }
}
