//! Player and administrator sign-in endpoints.
//!
//! ```text
//! POST /api/auth/login {"username":"alice"}
//! POST /api/auth/logout
//! POST /api/admin/auth/login {"username":"admin","password":"..."}
//! POST /api/admin/auth/logout
//! GET /api/admin/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AdminCredentials, AdminLoginValidationError, Error, Player};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{SessionContext, SessionPlayer};
use crate::inbound::http::state::HttpState;

/// Player sign-in body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PlayerLoginRequest {
    #[schema(example = "alice")]
    pub username: String,
}

/// Signed-in player.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerLoginResponse {
    pub ok: bool,
    pub user: Player,
}

/// Admin sign-in body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

/// Signed-in administrator.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminSessionResponse {
    pub ok: bool,
    pub username: String,
}

fn ok() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}

/// Sign a player in, registering unknown usernames.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = PlayerLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = PlayerLoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank username", body = Error),
        (status = 403, description = "Account is blocked", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "playerLogin",
    security([])
)]
#[post("/auth/login")]
pub async fn player_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PlayerLoginRequest>,
) -> ApiResult<web::Json<PlayerLoginResponse>> {
    let outcome = state.players.sign_in(&payload.username).await?;
    let player = outcome.player;
    session.persist_player(&SessionPlayer {
        id: player.id,
        username: player.username.clone(),
    })?;
    Ok(web::Json(PlayerLoginResponse {
        ok: true,
        user: player,
    }))
}

/// End the player session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Signed out")),
    tags = ["auth"],
    operation_id = "playerLogout",
    security([])
)]
#[post("/auth/logout")]
pub async fn player_logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Some(player) = session.clear_player() {
        state.players.sign_out(&player.id).await?;
    }
    Ok(ok())
}

fn map_admin_validation_error(err: AdminLoginValidationError) -> Error {
    let field = match err {
        AdminLoginValidationError::EmptyUsername => "username",
        AdminLoginValidationError::EmptyPassword => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Authenticate an administrator.
#[utoipa::path(
    post,
    path = "/api/admin/auth/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AdminSessionResponse),
        (status = 400, description = "Missing credentials", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/auth/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AdminLoginRequest>,
) -> ApiResult<web::Json<AdminSessionResponse>> {
    let credentials = AdminCredentials::try_from_parts(&payload.username, &payload.password)
        .map_err(map_admin_validation_error)?;
    let admin = state.admin_auth.authenticate(&credentials).await?;
    session.persist_admin(&admin)?;
    Ok(web::Json(AdminSessionResponse {
        ok: true,
        username: admin.username().to_owned(),
    }))
}

/// End the administrator session.
#[utoipa::path(
    post,
    path = "/api/admin/auth/logout",
    responses((status = 200, description = "Signed out")),
    tags = ["admin"],
    operation_id = "adminLogout"
)]
#[post("/admin/auth/logout")]
pub async fn admin_logout(session: SessionContext) -> HttpResponse {
    session.clear_admin();
    ok()
}

/// The administrator bound to the session.
#[utoipa::path(
    get,
    path = "/api/admin/auth/me",
    responses(
        (status = 200, description = "Current admin", body = AdminSessionResponse),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminMe"
)]
#[get("/admin/auth/me")]
pub async fn admin_me(session: SessionContext) -> ApiResult<web::Json<AdminSessionResponse>> {
    let admin = session.require_admin()?;
    Ok(web::Json(AdminSessionResponse {
        ok: true,
        username: admin.username().to_owned(),
    }))
}
