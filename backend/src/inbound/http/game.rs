//! Player-facing wheel endpoints.
//!
//! ```text
//! POST /api/game/spin {"code":"TEST001","username":"alice"}
//! GET /api/game/history/alice
//! ```

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{SpinOutcome, SpinRequest};
use crate::domain::{Error, SpinHistoryEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Successful spin response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SpinResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub outcome: SpinOutcome,
}

/// A player's recent spins.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub ok: bool,
    pub history: Vec<SpinHistoryEntry>,
    pub count: usize,
}

/// Redeem a code and spin the wheel.
#[utoipa::path(
    post,
    path = "/api/game/spin",
    request_body = SpinRequest,
    responses(
        (status = 200, description = "Prize won", body = SpinResponse),
        (status = 400, description = "Missing fields or code not redeemable", body = Error),
        (status = 403, description = "Player is blocked", body = Error),
        (status = 404, description = "Unknown player or code", body = Error),
        (status = 409, description = "Code claimed concurrently", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["game"],
    operation_id = "spin",
    security([])
)]
#[post("/game/spin")]
pub async fn spin(
    state: web::Data<HttpState>,
    payload: web::Json<SpinRequest>,
) -> ApiResult<web::Json<SpinResponse>> {
    let outcome = state.spins.spin(payload.into_inner()).await?;
    Ok(web::Json(SpinResponse { ok: true, outcome }))
}

/// Latest spins for a username, newest first.
#[utoipa::path(
    get,
    path = "/api/game/history/{username}",
    params(("username" = String, Path, description = "Player name, any case")),
    responses(
        (status = 200, description = "Spin history", body = HistoryResponse),
        (status = 400, description = "Blank username", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["game"],
    operation_id = "spinHistory",
    security([])
)]
#[get("/game/history/{username}")]
pub async fn history(
    state: web::Data<HttpState>,
    username: web::Path<String>,
) -> ApiResult<web::Json<HistoryResponse>> {
    let entries = state.history.history(&username).await?;
    Ok(web::Json(HistoryResponse {
        ok: true,
        count: entries.len(),
        history: entries,
    }))
}
