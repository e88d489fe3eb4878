//! Port for prize table persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Prize, PrizeDraft, PrizePatch, ProbabilityUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by prize repository adapters.
    pub enum PrizeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "prize repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "prize repository query failed: {message}",
        /// A batch referenced a prize that does not exist.
        UnknownPrize { id: Uuid } => "prize {id} does not exist",
    }
}

/// Port for reading and mutating prizes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrizeRepository: Send + Sync {
    /// List prizes ordered by `order` ascending, optionally only active ones.
    async fn list(&self, active_only: bool) -> Result<Vec<Prize>, PrizeRepositoryError>;

    /// Find a prize by identifier.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Prize>, PrizeRepositoryError>;

    /// Insert prizes, assigning `max(order) + 1` onwards to drafts without an order.
    async fn insert(
        &self,
        drafts: &[PrizeDraft],
        now: DateTime<Utc>,
    ) -> Result<Vec<Prize>, PrizeRepositoryError>;

    /// Apply a validated patch.
    async fn update(
        &self,
        id: &Uuid,
        patch: &PrizePatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Prize>, PrizeRepositoryError>;

    /// Delete a prize; returns whether it existed.
    async fn delete(&self, id: &Uuid) -> Result<bool, PrizeRepositoryError>;

    /// Replace several probabilities in one all-or-nothing step.
    async fn update_probabilities(
        &self,
        updates: &[ProbabilityUpdate],
        now: DateTime<Utc>,
    ) -> Result<(), PrizeRepositoryError>;

    /// Number of stored prizes.
    async fn count(&self) -> Result<u64, PrizeRepositoryError>;
}
