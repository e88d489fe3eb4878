//! Driving port for reading and administering the prize table.

use async_trait::async_trait;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Prize, ProbabilityUpdate};

/// Raw prize fields for create and partial update requests.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrizeInput {
    pub name: Option<String>,
    pub color: Option<String>,
    pub probability: Option<f64>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

/// Domain use-case port for the prize table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrizeCatalogue: Send + Sync {
    /// Prizes in wheel order.
    async fn list(&self, active_only: bool) -> Result<Vec<Prize>, Error>;

    /// Create a prize; the name is required.
    async fn create(&self, input: PrizeInput) -> Result<Prize, Error>;

    /// Partially update a prize.
    async fn update(&self, id: &Uuid, input: PrizeInput) -> Result<Prize, Error>;

    /// Delete a prize.
    async fn delete(&self, id: &Uuid) -> Result<(), Error>;

    /// Replace several probabilities at once; the total must stay at 100.
    async fn update_probabilities(&self, updates: Vec<ProbabilityUpdate>) -> Result<(), Error>;

    /// Insert the built-in table into an empty prize store.
    async fn seed_defaults(&self) -> Result<Vec<Prize>, Error>;
}
