//! Admin statistics summary.

use std::sync::Arc;

use async_trait::async_trait;

use super::ports::{AdminStats, CodeRepository, PlayerRepository, RECENT_ACTIVITY_LIMIT, StatsQuery};
use super::repository_errors::{map_code_error, map_player_error};
use super::{CodeStatus, Error};

/// Summary service implementing [`StatsQuery`].
#[derive(Clone)]
pub struct StatsService {
    codes: Arc<dyn CodeRepository>,
    players: Arc<dyn PlayerRepository>,
}

impl StatsService {
    pub fn new(codes: Arc<dyn CodeRepository>, players: Arc<dyn PlayerRepository>) -> Self {
        Self { codes, players }
    }
}

#[async_trait]
impl StatsQuery for StatsService {
    async fn stats(&self) -> Result<AdminStats, Error> {
        let total_codes = self.codes.count(None).await.map_err(map_code_error)?;
        let active_codes = self
            .codes
            .count(Some(CodeStatus::Active))
            .await
            .map_err(map_code_error)?;
        let used_codes = self
            .codes
            .count(Some(CodeStatus::Used))
            .await
            .map_err(map_code_error)?;
        let total_users = self
            .players
            .count_regular()
            .await
            .map_err(map_player_error)?;
        let recent_activity = self
            .codes
            .recent_redemptions(RECENT_ACTIVITY_LIMIT)
            .await
            .map_err(map_code_error)?;
        Ok(AdminStats {
            total_codes,
            active_codes,
            used_codes,
            total_users,
            recent_activity,
        })
    }
}
