//! Driving port for redeeming a code and spinning the wheel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PrizeKey};

/// Raw spin input as supplied by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct SpinRequest {
    #[schema(example = "TEST001")]
    pub code: Option<String>,
    #[schema(example = "alice")]
    pub username: Option<String>,
}

/// Prize reported to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WonPrize {
    pub id: PrizeKey,
    #[schema(example = "Jackpot")]
    pub text: String,
    #[schema(example = "#D4AF37")]
    pub color: String,
}

/// Successful spin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinOutcome {
    /// Position of the winner in the candidate list the wheel renders.
    pub winning_index: usize,
    pub prize: WonPrize,
    pub message: String,
}

/// Domain use-case port for spins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpinCommand: Send + Sync {
    /// Redeem the code for the named player and draw a prize.
    async fn spin(&self, request: SpinRequest) -> Result<SpinOutcome, Error>;
}
