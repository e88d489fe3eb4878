//! Redemption engine: consume a code exactly once and draw a prize.
//!
//! The prize is drawn before the code is claimed so the winner can be written
//! by the same conditional update that consumes the code. A lost race leaves
//! the drawn prize unused; the caller gets the classification of the code as
//! it stands after the race and is never retried automatically.
//!
//! Everything after a successful claim (audit log, dashboard events) runs on
//! its own task. The request awaits it, but a client that disconnects cannot
//! cancel it, so every consumed code gets its log entry.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use super::ports::{
    CodeRepository, PlayerRepository, PrizeRepository, SpinCommand, SpinLogRepository,
    SpinOutcome, SpinRequest, WonPrize,
};
use super::repository_errors::{
    map_code_error, map_player_error, map_prize_error, map_spin_log_error,
};
use super::selection::{DrawSource, pick_by_draw, total_weight};
use super::{
    CodeRejection, CodeValue, Error, LiveEvent, LiveStatsBroadcaster, NewSpinLog, PrizeCandidate,
    RedemptionClaim, TraceId, Username,
};

/// Why a spin was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RedemptionError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{message}")]
    InvalidInput { message: String },
    #[error("User not found")]
    UserNotFound,
    #[error("User is blocked")]
    UserBlocked,
    #[error("Invalid Code")]
    CodeNotFound,
    #[error("{}", .0.message())]
    NotRedeemable(CodeRejection),
    #[error("Code could not be redeemed, please try again")]
    ClaimLost,
    #[error(transparent)]
    System(Error),
}

impl From<RedemptionError> for Error {
    fn from(value: RedemptionError) -> Self {
        let message = value.to_string();
        match value {
            RedemptionError::MissingField { field } => {
                Error::invalid_request(message).with_details(json!({ "field": field }))
            }
            RedemptionError::InvalidInput { .. } => Error::invalid_request(message),
            RedemptionError::UserNotFound | RedemptionError::CodeNotFound => {
                Error::not_found(message)
            }
            RedemptionError::UserBlocked => Error::forbidden(message),
            RedemptionError::NotRedeemable(rejection) => Error::invalid_request(message)
                .with_details(json!({ "reason": rejection.reason() })),
            RedemptionError::ClaimLost => Error::conflict(message),
            RedemptionError::System(error) => error,
        }
    }
}

/// Driven ports used by the engine.
#[derive(Clone)]
pub struct RedemptionPorts {
    pub codes: Arc<dyn CodeRepository>,
    pub prizes: Arc<dyn PrizeRepository>,
    pub logs: Arc<dyn SpinLogRepository>,
    pub players: Arc<dyn PlayerRepository>,
}

/// Redemption engine implementing [`SpinCommand`].
#[derive(Clone)]
pub struct RedemptionService {
    ports: RedemptionPorts,
    broadcaster: LiveStatsBroadcaster,
    clock: Arc<dyn Clock>,
    draw: Arc<dyn DrawSource>,
}

impl RedemptionService {
    pub fn new(
        ports: RedemptionPorts,
        broadcaster: LiveStatsBroadcaster,
        clock: Arc<dyn Clock>,
        draw: Arc<dyn DrawSource>,
    ) -> Self {
        Self {
            ports,
            broadcaster,
            clock,
            draw,
        }
    }

    /// Redeem a code for a player and report the prize.
    pub async fn redeem(&self, request: SpinRequest) -> Result<SpinOutcome, RedemptionError> {
        let code = parse_code(request.code.as_deref())?;
        let username = parse_username(request.username.as_deref())?;

        let player = self
            .ports
            .players
            .find_by_username(&username)
            .await
            .map_err(|err| RedemptionError::System(map_player_error(err)))?
            .ok_or(RedemptionError::UserNotFound)?;
        if player.is_blocked {
            return Err(RedemptionError::UserBlocked);
        }

        let candidates = self.load_candidates().await?;
        let draw = self.draw.draw(total_weight(&candidates));
        let (winning_index, winner) = pick_by_draw(&candidates, draw)
            .and_then(|index| candidates.get(index).map(|winner| (index, winner)))
            .ok_or_else(|| {
                RedemptionError::System(Error::internal("prize table has no candidates"))
            })?;

        let now = self.clock.utc();
        let claim = RedemptionClaim {
            code: code.clone(),
            player_id: player.id,
            username: player.username.to_string(),
            prize: winner.name.clone(),
            now,
        };
        let claimed = self
            .ports
            .codes
            .claim(&claim)
            .await
            .map_err(|err| RedemptionError::System(map_code_error(err)))?;
        if !claimed {
            return Err(self.classify_failure(&code, now).await);
        }

        info!(
            code = %code,
            player = %player.id,
            prize = %winner.name,
            "code redeemed"
        );
        let recording = tokio::spawn(TraceId::propagate(record(
            self.ports.logs.clone(),
            self.broadcaster.clone(),
            NewSpinLog {
                code: code.to_string(),
                prize: winner.name.clone(),
                player_id: player.id,
                username: player.username.to_string(),
                timestamp: now,
            },
        )));
        if let Err(err) = recording.await {
            error!(error = %err, code = %code, "spin recording task failed");
        }

        Ok(SpinOutcome {
            winning_index,
            prize: WonPrize {
                id: winner.key,
                text: winner.name.clone(),
                color: winner.color.clone(),
            },
            message: format!("Congratulations! You won {}", winner.name),
        })
    }

    async fn load_candidates(&self) -> Result<Vec<PrizeCandidate>, RedemptionError> {
        let prizes = self
            .ports
            .prizes
            .list(true)
            .await
            .map_err(|err| RedemptionError::System(map_prize_error(err)))?;
        if prizes.is_empty() {
            Ok(PrizeCandidate::builtin())
        } else {
            Ok(PrizeCandidate::from_prizes(&prizes))
        }
    }

    async fn classify_failure(
        &self,
        code: &CodeValue,
        now: chrono::DateTime<chrono::Utc>,
    ) -> RedemptionError {
        match self.ports.codes.find_by_code(code).await {
            Ok(None) => RedemptionError::CodeNotFound,
            Ok(Some(stored)) => match stored.diagnose_at(now) {
                Some(rejection) => RedemptionError::NotRedeemable(rejection),
                None => RedemptionError::ClaimLost,
            },
            Err(err) => RedemptionError::System(map_code_error(err)),
        }
    }
}

/// Append the audit record and notify dashboards.
///
/// The code is already consumed at this point, so failures are logged
/// rather than returned to the player.
async fn record(
    logs: Arc<dyn SpinLogRepository>,
    broadcaster: LiveStatsBroadcaster,
    entry: NewSpinLog,
) {
    match logs.append(&entry).await {
        Ok(log) => broadcaster.publish_admin(LiveEvent::SpinRecorded(log)),
        Err(err) => {
            let error = map_spin_log_error(err);
            error!(%error, code = %entry.code, "failed to append spin log");
        }
    }
    broadcaster.broadcast_kpis().await;
}

#[async_trait]
impl SpinCommand for RedemptionService {
    async fn spin(&self, request: SpinRequest) -> Result<SpinOutcome, Error> {
        self.redeem(request).await.map_err(Error::from)
    }
}

fn required<'a>(raw: Option<&'a str>, field: &'static str) -> Result<&'a str, RedemptionError> {
    raw.filter(|value| !value.trim().is_empty())
        .ok_or(RedemptionError::MissingField { field })
}

fn parse_code(raw: Option<&str>) -> Result<CodeValue, RedemptionError> {
    CodeValue::parse(required(raw, "Code")?).map_err(|err| RedemptionError::InvalidInput {
        message: err.to_string(),
    })
}

fn parse_username(raw: Option<&str>) -> Result<Username, RedemptionError> {
    Username::new(required(raw, "User")?).map_err(|err| RedemptionError::InvalidInput {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests;
