//! Port for spin code persistence.
//!
//! The only correctness-critical operation is [`CodeRepository::claim`]: it
//! must transition a code from `active` to `used` atomically, so that
//! concurrent claims on one code produce exactly one winner.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CodeStatus, CodeValue, Page, PageRequest, RedemptionClaim, SpinCode};

use super::define_port_error;

define_port_error! {
    /// Errors raised by code repository adapters.
    pub enum CodeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "code repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "code repository query failed: {message}",
    }
}

/// Filters for the admin code listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeListQuery {
    pub status: Option<CodeStatus>,
    /// Case-insensitive substring of the code.
    pub search: Option<String>,
    pub page: PageRequest,
}

impl CodeListQuery {
    /// Whether a code satisfies the status and search filters.
    pub fn matches(&self, code: &SpinCode) -> bool {
        let status_ok = self.status.is_none_or(|status| code.status == status);
        let search_ok = self
            .search
            .as_deref()
            .is_none_or(|term| code.code.as_str().contains(&term.trim().to_uppercase()));
        status_ok && search_ok
    }
}

/// Port for reading and mutating spin codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeRepository: Send + Sync {
    /// Atomically mark the claimed code as used.
    ///
    /// Matches only when the code is `active` and its deadline, if any, lies
    /// strictly after `claim.now`. Returns `true` when exactly one code was
    /// transitioned and `false` when nothing matched.
    async fn claim(&self, claim: &RedemptionClaim) -> Result<bool, CodeRepositoryError>;

    /// Find a code by its normalised value.
    async fn find_by_code(&self, code: &CodeValue)
    -> Result<Option<SpinCode>, CodeRepositoryError>;

    /// Find a code by identifier.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SpinCode>, CodeRepositoryError>;

    /// Insert freshly issued codes, skipping values that already exist.
    ///
    /// Returns the codes that were stored.
    async fn insert_batch(&self, codes: &[SpinCode]) -> Result<Vec<SpinCode>, CodeRepositoryError>;

    /// List codes newest first.
    async fn list(&self, query: &CodeListQuery) -> Result<Page<SpinCode>, CodeRepositoryError>;

    /// Set the status of a code unconditionally.
    async fn set_status(
        &self,
        id: &Uuid,
        status: CodeStatus,
    ) -> Result<Option<SpinCode>, CodeRepositoryError>;

    /// Set a code back to `active` unless it has ever been redeemed.
    ///
    /// Returns `None` when the code is missing or has been redeemed.
    async fn reactivate(&self, id: &Uuid) -> Result<Option<SpinCode>, CodeRepositoryError>;

    /// Count codes, optionally restricted to one status.
    async fn count(&self, status: Option<CodeStatus>) -> Result<u64, CodeRepositoryError>;

    /// Most recently redeemed codes, newest first.
    async fn recent_redemptions(&self, limit: u32) -> Result<Vec<SpinCode>, CodeRepositoryError>;
}
