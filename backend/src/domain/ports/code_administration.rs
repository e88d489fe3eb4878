//! Driving port for administering spin codes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{Error, Page, SpinCode};

/// Raw code generation input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodesRequest {
    /// Clamped to `1..=200`; defaults to 1.
    pub count: Option<u32>,
    /// Clamped to `6..=16`, prefix included; defaults to 8.
    pub length: Option<u32>,
    pub prefix: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    /// Set by the adapter from the admin session.
    #[serde(skip)]
    pub created_by: Option<String>,
}

/// Raw code listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CodeListRequest {
    /// `active`, `used`, `disabled` or `expired`.
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Domain use-case port for code administration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeAdministration: Send + Sync {
    /// Issue a batch of random codes; returns the codes actually stored.
    async fn generate(&self, request: GenerateCodesRequest) -> Result<Vec<SpinCode>, Error>;

    /// List codes newest first.
    async fn list(&self, request: CodeListRequest) -> Result<Page<SpinCode>, Error>;

    /// Disable a code.
    async fn disable(&self, id: &Uuid) -> Result<SpinCode, Error>;

    /// Re-enable a code that has never been redeemed.
    async fn enable(&self, id: &Uuid) -> Result<SpinCode, Error>;
}
