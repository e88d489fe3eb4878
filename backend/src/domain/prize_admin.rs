//! Prize table administration.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use super::ports::{PrizeCatalogue, PrizeInput, PrizeRepository};
use super::repository_errors::map_prize_error;
use super::{
    Error, LiveEvent, LiveStatsBroadcaster, Prize, PrizeDraft, PrizePatch, PrizeValidationError,
    ProbabilityUpdate, validate_probability_batch,
};

impl From<PrizeValidationError> for Error {
    fn from(value: PrizeValidationError) -> Self {
        Error::invalid_request(value.to_string())
    }
}

/// Prize table service implementing [`PrizeCatalogue`].
#[derive(Clone)]
pub struct PrizeAdminService {
    prizes: Arc<dyn PrizeRepository>,
    broadcaster: LiveStatsBroadcaster,
    clock: Arc<dyn Clock>,
}

impl PrizeAdminService {
    pub fn new(
        prizes: Arc<dyn PrizeRepository>,
        broadcaster: LiveStatsBroadcaster,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            prizes,
            broadcaster,
            clock,
        }
    }
}

#[async_trait]
impl PrizeCatalogue for PrizeAdminService {
    async fn list(&self, active_only: bool) -> Result<Vec<Prize>, Error> {
        self.prizes
            .list(active_only)
            .await
            .map_err(map_prize_error)
    }

    async fn create(&self, input: PrizeInput) -> Result<Prize, Error> {
        let draft = PrizeDraft::new(
            input.name.unwrap_or_default(),
            input.color,
            input.probability,
            input.is_active,
            input.order,
        )?;
        let prize = self
            .prizes
            .insert(std::slice::from_ref(&draft), self.clock.utc())
            .await
            .map_err(map_prize_error)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::internal("prize insert returned no rows"))?;
        info!(prize = %prize.id, name = %prize.name, "prize created");
        self.broadcaster
            .publish_admin(LiveEvent::PrizeCreated(prize.clone()));
        Ok(prize)
    }

    async fn update(&self, id: &Uuid, input: PrizeInput) -> Result<Prize, Error> {
        let patch = PrizePatch {
            name: input.name,
            color: input.color,
            probability: input.probability,
            is_active: input.is_active,
            order: input.order,
        }
        .validated()?;
        let prize = self
            .prizes
            .update(id, &patch, self.clock.utc())
            .await
            .map_err(map_prize_error)?
            .ok_or_else(|| Error::not_found("Prize not found"))?;
        info!(prize = %prize.id, "prize updated");
        self.broadcaster
            .publish_admin(LiveEvent::PrizeUpdated(prize.clone()));
        Ok(prize)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), Error> {
        if !self.prizes.delete(id).await.map_err(map_prize_error)? {
            return Err(Error::not_found("Prize not found"));
        }
        info!(prize = %id, "prize deleted");
        self.broadcaster.publish_admin(LiveEvent::PrizeDeleted(*id));
        Ok(())
    }

    async fn update_probabilities(&self, updates: Vec<ProbabilityUpdate>) -> Result<(), Error> {
        if updates.is_empty() {
            return Err(Error::invalid_request("Invalid probabilities data"));
        }
        validate_probability_batch(&updates)?;
        self.prizes
            .update_probabilities(&updates, self.clock.utc())
            .await
            .map_err(map_prize_error)?;
        info!(count = updates.len(), "prize probabilities updated");
        self.broadcaster
            .publish_admin(LiveEvent::ProbabilitiesUpdated);
        Ok(())
    }

    async fn seed_defaults(&self) -> Result<Vec<Prize>, Error> {
        if self.prizes.count().await.map_err(map_prize_error)? > 0 {
            return Err(Error::invalid_request("Prizes already exist"));
        }
        let seeded = self
            .prizes
            .insert(&PrizeDraft::defaults(), self.clock.utc())
            .await
            .map_err(map_prize_error)?;
        info!(count = seeded.len(), "default prizes seeded");
        for prize in &seeded {
            self.broadcaster
                .publish_admin(LiveEvent::PrizeCreated(prize.clone()));
        }
        Ok(seeded)
    }
}
