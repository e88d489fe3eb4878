//! Admin player management endpoints.
//!
//! ```text
//! GET /api/admin/users
//! GET /api/admin/users/{id}
//! PUT /api/admin/users/{id}/block
//! ```

use actix_web::{get, put, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Player, PlayerId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Regular players, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayersResponse {
    pub ok: bool,
    pub users: Vec<Player>,
}

/// One player record.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerResponse {
    pub ok: bool,
    pub user: Player,
}

/// Outcome of a block toggle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    pub ok: bool,
    pub message: String,
    pub is_blocked: bool,
}

/// List players with the `user` role.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Players", body = PlayersResponse),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listPlayers"
)]
#[get("/admin/users")]
pub async fn list_players(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PlayersResponse>> {
    session.require_admin()?;
    let users = state.player_admin.list().await?;
    Ok(web::Json(PlayersResponse { ok: true, users }))
}

/// Fetch one player.
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "Player identifier")),
    responses(
        (status = 200, description = "Player", body = PlayerResponse),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "getPlayer"
)]
#[get("/admin/users/{id}")]
pub async fn get_player(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<PlayerResponse>> {
    session.require_admin()?;
    let user = state
        .player_admin
        .get(&PlayerId::from_uuid(id.into_inner()))
        .await?;
    Ok(web::Json(PlayerResponse { ok: true, user }))
}

/// Block an unblocked player or unblock a blocked one.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/block",
    params(("id" = Uuid, Path, description = "Player identifier")),
    responses(
        (status = 200, description = "Block state flipped", body = BlockResponse),
        (status = 400, description = "Cannot block admin", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "togglePlayerBlock"
)]
#[put("/admin/users/{id}/block")]
pub async fn toggle_player_block(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<BlockResponse>> {
    session.require_admin()?;
    let updated = state
        .player_admin
        .toggle_block(&PlayerId::from_uuid(id.into_inner()))
        .await?;
    let message = if updated.is_blocked {
        "User Blocked"
    } else {
        "User Unblocked"
    };
    Ok(web::Json(BlockResponse {
        ok: true,
        message: message.to_owned(),
        is_blocked: updated.is_blocked,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::Session;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use serde_json::{Value, json};

    use crate::domain::test_support::player;
    use crate::inbound::http::session::ADMIN_KEY;
    use crate::inbound::http::test_utils::{MockPorts, session_cookie, test_session_middleware};

    macro_rules! app {
        ($ports:expr) => {
            test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .app_data(web::Data::new($ports.into_state()))
                    .route(
                        "/login",
                        web::get().to(|session: Session| async move {
                            session.insert(ADMIN_KEY, "root").expect("insert admin");
                            HttpResponse::Ok()
                        }),
                    )
                    .service(
                        web::scope("/api")
                            .service(list_players)
                            .service(get_player)
                            .service(toggle_player_block),
                    ),
            )
            .await
        };
    }

    async fn admin_cookie<S>(app: &S) -> Cookie<'static>
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let res = test::call_service(app, test::TestRequest::get().uri("/login").to_request()).await;
        session_cookie(&res)
    }

    #[actix_web::test]
    async fn anonymous_requests_are_rejected() {
        let app = app!(MockPorts::default());
        let id = Uuid::nil();
        for request in [
            test::TestRequest::get().uri("/api/admin/users"),
            test::TestRequest::get().uri(&format!("/api/admin/users/{id}")),
            test::TestRequest::put().uri(&format!("/api/admin/users/{id}/block")),
        ] {
            let res = test::call_service(&app, request.to_request()).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[actix_web::test]
    async fn list_wraps_players_in_users() {
        let mut ports = MockPorts::default();
        ports
            .player_admin
            .expect_list()
            .returning(|| Ok(vec![player("bob"), player("alice")]));
        let app = app!(ports);
        let cookie = admin_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/admin/users")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["users"][0]["username"], "bob");
        assert_eq!(body["users"][1]["isBlocked"], false);
    }

    #[actix_web::test]
    async fn unknown_player_is_not_found() {
        let mut ports = MockPorts::default();
        ports
            .player_admin
            .expect_get()
            .returning(|_| Err(Error::not_found("User not found")));
        let app = app!(ports);
        let cookie = admin_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/admin/users/{}", Uuid::nil()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest::rstest]
    #[case(true, "User Blocked")]
    #[case(false, "User Unblocked")]
    #[actix_web::test]
    async fn toggle_reports_the_new_state(#[case] blocked: bool, #[case] message: &str) {
        let target = Uuid::new_v4();
        let mut ports = MockPorts::default();
        ports
            .player_admin
            .expect_toggle_block()
            .withf(move |id| *id.as_uuid() == target)
            .returning(move |id| {
                let mut updated = player("alice");
                updated.id = *id;
                updated.is_blocked = blocked;
                Ok(updated)
            });
        let app = app!(ports);
        let cookie = admin_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/admin/users/{target}/block"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({"ok": true, "message": message, "isBlocked": blocked})
        );
    }

    #[actix_web::test]
    async fn blocking_an_admin_is_a_bad_request() {
        let mut ports = MockPorts::default();
        ports
            .player_admin
            .expect_toggle_block()
            .returning(|_| Err(Error::invalid_request("Cannot block admin")));
        let app = app!(ports);
        let cookie = admin_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/admin/users/{}/block", Uuid::nil()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Cannot block admin");
    }
}
