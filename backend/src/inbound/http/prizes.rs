//! Prize table endpoints, public and admin.
//!
//! ```text
//! GET /api/prizes
//! GET /api/prizes/defaults
//! GET /api/admin/prizes
//! PUT /api/admin/prizes/probabilities/batch [{"id":"...","probability":25}]
//! ```

use actix_web::{delete, get, post, put, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::PrizeInput;
use crate::domain::{DEFAULT_PRIZES, DefaultPrize, Error, Prize, ProbabilityUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Prizes in wheel order.
#[derive(Debug, Serialize, ToSchema)]
pub struct PrizeListResponse {
    pub ok: bool,
    pub prizes: Vec<Prize>,
}

/// The built-in prize table.
#[derive(Debug, Serialize, ToSchema)]
pub struct DefaultPrizesResponse {
    pub ok: bool,
    pub prizes: Vec<DefaultPrize>,
}

/// A single prize after a write.
#[derive(Debug, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub ok: bool,
    pub prize: Prize,
}

/// Acknowledgement for writes without a body.
#[derive(Debug, Serialize, ToSchema)]
pub struct PrizeAck {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl PrizeAck {
    fn new(message: &str) -> Self {
        Self {
            ok: true,
            message: message.to_owned(),
            count: None,
        }
    }
}

/// Active prizes for the wheel.
#[utoipa::path(
    get,
    path = "/api/prizes",
    responses(
        (status = 200, description = "Active prizes", body = PrizeListResponse),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["game"],
    operation_id = "listActivePrizes",
    security([])
)]
#[get("/prizes")]
pub async fn public_prizes(state: web::Data<HttpState>) -> ApiResult<web::Json<PrizeListResponse>> {
    let prizes = state.prizes.list(true).await?;
    Ok(web::Json(PrizeListResponse { ok: true, prizes }))
}

/// Built-in table the wheel falls back to when nothing is configured.
#[utoipa::path(
    get,
    path = "/api/prizes/defaults",
    responses((status = 200, description = "Default prizes", body = DefaultPrizesResponse)),
    tags = ["game"],
    operation_id = "defaultPrizes",
    security([])
)]
#[get("/prizes/defaults")]
pub async fn default_prizes() -> web::Json<DefaultPrizesResponse> {
    web::Json(DefaultPrizesResponse {
        ok: true,
        prizes: DEFAULT_PRIZES.to_vec(),
    })
}

/// Every configured prize.
#[utoipa::path(
    get,
    path = "/api/admin/prizes",
    responses(
        (status = 200, description = "All prizes", body = PrizeListResponse),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListPrizes"
)]
#[get("/admin/prizes")]
pub async fn list_prizes(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PrizeListResponse>> {
    session.require_admin()?;
    let prizes = state.prizes.list(false).await?;
    Ok(web::Json(PrizeListResponse { ok: true, prizes }))
}

/// Active prizes as seen by the wheel.
#[utoipa::path(
    get,
    path = "/api/admin/prizes/active",
    responses(
        (status = 200, description = "Active prizes", body = PrizeListResponse),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListActivePrizes"
)]
#[get("/admin/prizes/active")]
pub async fn list_active_prizes(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PrizeListResponse>> {
    session.require_admin()?;
    let prizes = state.prizes.list(true).await?;
    Ok(web::Json(PrizeListResponse { ok: true, prizes }))
}

/// Add a prize at the end of the wheel.
#[utoipa::path(
    post,
    path = "/api/admin/prizes",
    request_body = PrizeInput,
    responses(
        (status = 200, description = "Prize created", body = PrizeResponse),
        (status = 400, description = "Invalid prize", body = Error),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createPrize"
)]
#[post("/admin/prizes")]
pub async fn create_prize(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PrizeInput>,
) -> ApiResult<web::Json<PrizeResponse>> {
    session.require_admin()?;
    let prize = state.prizes.create(payload.into_inner()).await?;
    Ok(web::Json(PrizeResponse { ok: true, prize }))
}

/// Replace all probabilities at once; the batch must sum to 100.
#[utoipa::path(
    put,
    path = "/api/admin/prizes/probabilities/batch",
    request_body = Vec<ProbabilityUpdate>,
    responses(
        (status = 200, description = "Probabilities updated", body = PrizeAck),
        (status = 400, description = "Total is not 100 or a weight is out of range", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Unknown prize", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updatePrizeProbabilities"
)]
#[put("/admin/prizes/probabilities/batch")]
pub async fn update_probabilities(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Vec<ProbabilityUpdate>>,
) -> ApiResult<web::Json<PrizeAck>> {
    session.require_admin()?;
    state.prizes.update_probabilities(payload.into_inner()).await?;
    Ok(web::Json(PrizeAck::new("Probabilities updated")))
}

/// Partially update a prize.
#[utoipa::path(
    put,
    path = "/api/admin/prizes/{id}",
    params(("id" = Uuid, Path, description = "Prize identifier")),
    request_body = PrizeInput,
    responses(
        (status = 200, description = "Prize updated", body = PrizeResponse),
        (status = 400, description = "Invalid prize", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Prize not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updatePrize"
)]
#[put("/admin/prizes/{id}")]
pub async fn update_prize(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<PrizeInput>,
) -> ApiResult<web::Json<PrizeResponse>> {
    session.require_admin()?;
    let prize = state.prizes.update(&id, payload.into_inner()).await?;
    Ok(web::Json(PrizeResponse { ok: true, prize }))
}

/// Remove a prize.
#[utoipa::path(
    delete,
    path = "/api/admin/prizes/{id}",
    params(("id" = Uuid, Path, description = "Prize identifier")),
    responses(
        (status = 200, description = "Prize deleted", body = PrizeAck),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Prize not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deletePrize"
)]
#[delete("/admin/prizes/{id}")]
pub async fn delete_prize(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<PrizeAck>> {
    session.require_admin()?;
    state.prizes.delete(&id).await?;
    Ok(web::Json(PrizeAck::new("Prize deleted")))
}

/// Insert the built-in table into an empty catalogue.
#[utoipa::path(
    post,
    path = "/api/admin/prizes/seed",
    responses(
        (status = 200, description = "Defaults seeded", body = PrizeAck),
        (status = 400, description = "Prizes already exist", body = Error),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "seedPrizes"
)]
#[post("/admin/prizes/seed")]
pub async fn seed_prizes(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PrizeAck>> {
    session.require_admin()?;
    let seeded = state.prizes.seed_defaults().await?;
    Ok(web::Json(PrizeAck {
        count: Some(seeded.len()),
        ..PrizeAck::new("Default prizes seeded")
    }))
}
