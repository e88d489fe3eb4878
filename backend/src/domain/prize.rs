//! Prize definitions and the built-in fallback table.
//!
//! Probabilities are relative weights in `0..=100`. Only the admin batch
//! update insists that the active table sums to 100; single edits may leave
//! the table unbalanced and the draw still works on relative weights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::selection::Weighted;

/// Colour applied when a new prize omits one.
pub const DEFAULT_PRIZE_COLOR: &str = "#E11D48";
/// Weight applied when a new prize omits one.
pub const DEFAULT_PRIZE_PROBABILITY: f64 = 10.0;
/// Allowed deviation from 100 for a batch probability update.
pub const PROBABILITY_TOLERANCE: f64 = 0.1;

/// Validation errors raised by prize construction and batch updates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PrizeValidationError {
    #[error("Prize name is required")]
    EmptyName,
    #[error("Prize color is required")]
    EmptyColor,
    #[error("Probability must be between 0 and 100")]
    ProbabilityOutOfRange { value: f64 },
    #[error("Total probability must be 100%. Current: {total:.1}%")]
    TotalNotHundred { total: f64 },
}

/// Entry of the built-in prize table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefaultPrize {
    pub name: &'static str,
    pub color: &'static str,
    pub probability: f64,
}

/// The single built-in prize table.
///
/// Used when no active prize is configured, served to clients for fallback
/// rendering, and inserted by the admin seed operation.
pub const DEFAULT_PRIZES: [DefaultPrize; 6] = [
    DefaultPrize {
        name: "100 THB",
        color: "#E11D48",
        probability: 25.0,
    },
    DefaultPrize {
        name: "No Luck",
        color: "#607D8B",
        probability: 30.0,
    },
    DefaultPrize {
        name: "500 THB",
        color: "#D4AF37",
        probability: 15.0,
    },
    DefaultPrize {
        name: "Spin Again",
        color: "#10B981",
        probability: 15.0,
    },
    DefaultPrize {
        name: "1000 THB",
        color: "#E11D48",
        probability: 10.0,
    },
    DefaultPrize {
        name: "Jackpot",
        color: "#D4AF37",
        probability: 5.0,
    },
];

/// A configured prize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub probability: f64,
    pub is_active: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a prize.
#[derive(Debug, Clone, PartialEq)]
pub struct PrizeDraft {
    pub name: String,
    pub color: String,
    pub probability: f64,
    pub is_active: bool,
    pub order: Option<i32>,
}

impl PrizeDraft {
    /// Validate raw fields, applying defaults for omitted ones.
    pub fn new(
        name: impl AsRef<str>,
        color: Option<String>,
        probability: Option<f64>,
        is_active: Option<bool>,
        order: Option<i32>,
    ) -> Result<Self, PrizeValidationError> {
        let name = validate_name(name.as_ref())?;
        let color = match color {
            Some(raw) => validate_color(&raw)?,
            None => DEFAULT_PRIZE_COLOR.to_owned(),
        };
        let probability = validate_probability(probability.unwrap_or(DEFAULT_PRIZE_PROBABILITY))?;
        Ok(Self {
            name,
            color,
            probability,
            is_active: is_active.unwrap_or(true),
            order,
        })
    }

    /// Drafts for every entry in [`DEFAULT_PRIZES`], ordered from zero.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_PRIZES
            .iter()
            .zip(0_i32..)
            .map(|(prize, order)| Self {
                name: prize.name.to_owned(),
                color: prize.color.to_owned(),
                probability: prize.probability,
                is_active: true,
                order: Some(order),
            })
            .collect()
    }
}

/// Partial update for an existing prize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrizePatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub probability: Option<f64>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

impl PrizePatch {
    /// Validate the fields that are present.
    pub fn validated(self) -> Result<Self, PrizeValidationError> {
        Ok(Self {
            name: self.name.as_deref().map(validate_name).transpose()?,
            color: self.color.as_deref().map(validate_color).transpose()?,
            probability: self.probability.map(validate_probability).transpose()?,
            is_active: self.is_active,
            order: self.order,
        })
    }

    /// Apply the patch to a prize, stamping `updated_at`.
    pub fn apply(&self, prize: &mut Prize, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            prize.name.clone_from(name);
        }
        if let Some(color) = &self.color {
            prize.color.clone_from(color);
        }
        if let Some(probability) = self.probability {
            prize.probability = probability;
        }
        if let Some(is_active) = self.is_active {
            prize.is_active = is_active;
        }
        if let Some(order) = self.order {
            prize.order = order;
        }
        prize.updated_at = now;
    }
}

/// One entry of a batch probability update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProbabilityUpdate {
    pub id: Uuid,
    pub probability: f64,
}

/// Check that a batch update keeps each weight in range and sums to 100.
///
/// # Examples
/// ```
/// use spinwheel::domain::{ProbabilityUpdate, validate_probability_batch};
/// use uuid::Uuid;
///
/// let batch = [
///     ProbabilityUpdate { id: Uuid::new_v4(), probability: 60.0 },
///     ProbabilityUpdate { id: Uuid::new_v4(), probability: 40.05 },
/// ];
/// assert!(validate_probability_batch(&batch).is_ok());
/// ```
pub fn validate_probability_batch(
    updates: &[ProbabilityUpdate],
) -> Result<(), PrizeValidationError> {
    for update in updates {
        validate_probability(update.probability)?;
    }
    let total: f64 = updates.iter().map(|update| update.probability).sum();
    if (total - 100.0).abs() > PROBABILITY_TOLERANCE {
        return Err(PrizeValidationError::TotalNotHundred { total });
    }
    Ok(())
}

/// Sort positions for new prizes.
///
/// Drafts with an explicit order keep it; the rest continue after
/// `max_order`, starting from zero on an empty table.
///
/// # Examples
/// ```
/// use spinwheel::domain::{PrizeDraft, assign_orders};
///
/// let drafts = [
///     PrizeDraft::new("Mug", None, None, None, None).unwrap(),
///     PrizeDraft::new("Pen", None, None, None, Some(1)).unwrap(),
/// ];
/// assert_eq!(assign_orders(&drafts, Some(4)), vec![5, 1]);
/// ```
pub fn assign_orders(drafts: &[PrizeDraft], max_order: Option<i32>) -> Vec<i32> {
    let mut next = max_order.map_or(0, |order| order.saturating_add(1));
    drafts
        .iter()
        .map(|draft| match draft.order {
            Some(order) => order,
            None => {
                let order = next;
                next = next.saturating_add(1);
                order
            }
        })
        .collect()
}

fn validate_name(raw: &str) -> Result<String, PrizeValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PrizeValidationError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

fn validate_color(raw: &str) -> Result<String, PrizeValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PrizeValidationError::EmptyColor);
    }
    Ok(trimmed.to_owned())
}

fn validate_probability(value: f64) -> Result<f64, PrizeValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(PrizeValidationError::ProbabilityOutOfRange { value });
    }
    Ok(value)
}

/// Identifier reported for the winning prize.
///
/// Built-in prizes have no stored id and are reported by their 1-based
/// position instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PrizeKey {
    Stored(Uuid),
    Builtin(usize),
}

/// A prize as seen by a single draw.
#[derive(Debug, Clone, PartialEq)]
pub struct PrizeCandidate {
    pub key: PrizeKey,
    pub name: String,
    pub color: String,
    pub weight: f64,
}

impl PrizeCandidate {
    /// Candidate list built from the configured active prizes, in table order.
    pub fn from_prizes(prizes: &[Prize]) -> Vec<Self> {
        prizes
            .iter()
            .map(|prize| Self {
                key: PrizeKey::Stored(prize.id),
                name: prize.name.clone(),
                color: prize.color.clone(),
                weight: prize.probability,
            })
            .collect()
    }

    /// Candidate list built from [`DEFAULT_PRIZES`].
    pub fn builtin() -> Vec<Self> {
        DEFAULT_PRIZES
            .iter()
            .enumerate()
            .map(|(index, prize)| Self {
                key: PrizeKey::Builtin(index + 1),
                name: prize.name.to_owned(),
                color: prize.color.to_owned(),
                weight: prize.probability,
            })
            .collect()
    }
}

impl Weighted for PrizeCandidate {
    fn weight(&self) -> f64 {
        self.weight
    }
}
