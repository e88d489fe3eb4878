//! Code administration: batch issuance, listing and status changes.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use super::ports::{
    CodeAdministration, CodeListQuery, CodeListRequest, CodeRepository, GenerateCodesRequest,
};
use super::repository_errors::map_code_error;
use super::{
    CodeStatus, CodeValue, Error, LiveEvent, LiveStatsBroadcaster, Page, PageRequest, SpinCode,
};

/// Characters used for the random part of a code.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const MIN_GENERATE_COUNT: u32 = 1;
pub const MAX_GENERATE_COUNT: u32 = 200;
pub const MIN_CODE_LENGTH: u32 = 6;
pub const MAX_CODE_LENGTH: u32 = 16;
pub const DEFAULT_CODE_LENGTH: u32 = 8;

/// Clamped generation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    count: usize,
    prefix: String,
    random_len: usize,
}

impl GenerationPlan {
    /// Clamp the raw request and check the prefix leaves enough room.
    ///
    /// # Examples
    /// ```
    /// use spinwheel::domain::GenerationPlan;
    ///
    /// let plan = GenerationPlan::new(Some(500), Some(3), Some("vip")).unwrap();
    /// assert_eq!(plan.count(), 200);
    /// assert_eq!(plan.code_length(), 6);
    /// ```
    pub fn new(
        count: Option<u32>,
        length: Option<u32>,
        prefix: Option<&str>,
    ) -> Result<Self, Error> {
        let count = count
            .unwrap_or(MIN_GENERATE_COUNT)
            .clamp(MIN_GENERATE_COUNT, MAX_GENERATE_COUNT);
        let length = length
            .unwrap_or(DEFAULT_CODE_LENGTH)
            .clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH);
        let prefix = prefix.unwrap_or_default().trim().to_uppercase();
        let prefix_len = prefix.chars().count();
        let length = usize::try_from(length).map_err(|_| Error::internal("length overflow"))?;
        let count = usize::try_from(count).map_err(|_| Error::internal("count overflow"))?;
        if prefix_len >= length {
            return Err(Error::invalid_request(
                "Prefix must be shorter than the code length",
            ));
        }
        let random_len = length - prefix_len;
        if !room_for(random_len, count) {
            return Err(Error::invalid_request(format!(
                "A prefix of {prefix_len} characters leaves too few combinations for {count} codes"
            )));
        }
        Ok(Self {
            count,
            prefix,
            random_len,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    /// Total code length, prefix included.
    pub fn code_length(&self) -> usize {
        self.prefix.chars().count() + self.random_len
    }

    /// Produce `count` distinct code values.
    pub fn draw_codes<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<CodeValue>, Error> {
        let mut seen = HashSet::with_capacity(self.count);
        let mut codes = Vec::with_capacity(self.count);
        while codes.len() < self.count {
            let mut raw = self.prefix.clone();
            raw.extend((0..self.random_len).map(|_| {
                let index = rng.gen_range(0..CODE_ALPHABET.len());
                char::from(CODE_ALPHABET[index])
            }));
            if seen.insert(raw.clone()) {
                let code = CodeValue::parse(raw)
                    .map_err(|err| Error::invalid_request(err.to_string()))?;
                codes.push(code);
            }
        }
        Ok(codes)
    }
}

/// Whether `random_len` characters yield at least `count` distinct values.
fn room_for(random_len: usize, count: usize) -> bool {
    let Ok(exponent) = u32::try_from(random_len) else {
        return true;
    };
    CODE_ALPHABET
        .len()
        .checked_pow(exponent)
        .is_none_or(|combinations| combinations >= count)
}

/// Code administration service implementing [`CodeAdministration`].
#[derive(Clone)]
pub struct CodeAdminService {
    codes: Arc<dyn CodeRepository>,
    broadcaster: LiveStatsBroadcaster,
    clock: Arc<dyn Clock>,
}

impl CodeAdminService {
    pub fn new(
        codes: Arc<dyn CodeRepository>,
        broadcaster: LiveStatsBroadcaster,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codes,
            broadcaster,
            clock,
        }
    }

    async fn require(&self, id: &Uuid) -> Result<SpinCode, Error> {
        self.codes
            .find_by_id(id)
            .await
            .map_err(map_code_error)?
            .ok_or_else(|| Error::not_found("Code not found"))
    }
}

#[async_trait]
impl CodeAdministration for CodeAdminService {
    async fn generate(&self, request: GenerateCodesRequest) -> Result<Vec<SpinCode>, Error> {
        let plan = GenerationPlan::new(request.count, request.length, request.prefix.as_deref())?;
        let values = plan.draw_codes(&mut rand::thread_rng())?;
        let now = self.clock.utc();
        let note = request
            .note
            .map(|note| note.trim().to_owned())
            .filter(|note| !note.is_empty());
        let batch: Vec<SpinCode> = values
            .into_iter()
            .map(|value| SpinCode {
                note: note.clone(),
                expires_at: request.expires_at,
                created_by: request.created_by.clone(),
                ..SpinCode::issue(value, now)
            })
            .collect();

        let stored = self
            .codes
            .insert_batch(&batch)
            .await
            .map_err(map_code_error)?;
        info!(
            requested = batch.len(),
            stored = stored.len(),
            admin = request.created_by.as_deref().unwrap_or("unknown"),
            "spin codes generated"
        );
        self.broadcaster.broadcast_kpis().await;
        self.broadcaster.publish_admin(LiveEvent::CodesGenerated {
            count: stored.len(),
        });
        Ok(stored)
    }

    async fn list(&self, request: CodeListRequest) -> Result<Page<SpinCode>, Error> {
        let status = request
            .status
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(str::parse::<CodeStatus>)
            .transpose()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let search = request
            .search
            .map(|term| term.trim().to_owned())
            .filter(|term| !term.is_empty());
        let query = CodeListQuery {
            status,
            search,
            page: PageRequest::new(request.page, request.limit),
        };
        self.codes.list(&query).await.map_err(map_code_error)
    }

    async fn disable(&self, id: &Uuid) -> Result<SpinCode, Error> {
        let code = self
            .codes
            .set_status(id, CodeStatus::Disabled)
            .await
            .map_err(map_code_error)?
            .ok_or_else(|| Error::not_found("Code not found"))?;
        info!(code = %code.code, "spin code disabled");
        Ok(code)
    }

    async fn enable(&self, id: &Uuid) -> Result<SpinCode, Error> {
        if let Some(code) = self.codes.reactivate(id).await.map_err(map_code_error)? {
            info!(code = %code.code, "spin code enabled");
            return Ok(code);
        }
        // Nothing matched: either missing or redeemed at some point.
        let existing = self.require(id).await?;
        if existing.has_been_redeemed() {
            Err(Error::invalid_request("Cannot enable a used code"))
        } else {
            Err(Error::conflict("Code changed while enabling, please retry"))
        }
    }
}
