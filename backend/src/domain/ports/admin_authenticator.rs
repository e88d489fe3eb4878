//! Driving port for administrator login.

use async_trait::async_trait;

use crate::domain::{AdminCredentials, AdminIdentity, Error};

/// Domain use-case port for admin authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminAuthenticator: Send + Sync {
    /// Validate credentials and return the authenticated admin.
    async fn authenticate(&self, credentials: &AdminCredentials) -> Result<AdminIdentity, Error>;
}
