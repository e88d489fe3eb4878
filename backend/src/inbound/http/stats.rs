//! Admin dashboard summary.

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::AdminStats;
use crate::domain::{Error, SpinCode};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Code and player counters.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsCounters {
    pub total_codes: u64,
    pub active_codes: u64,
    pub used_codes: u64,
    pub total_users: u64,
}

/// Counters plus the latest redemptions.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub ok: bool,
    pub stats: StatsCounters,
    pub recent_activity: Vec<SpinCode>,
}

impl From<AdminStats> for StatsResponse {
    fn from(summary: AdminStats) -> Self {
        Self {
            ok: true,
            stats: StatsCounters {
                total_codes: summary.total_codes,
                active_codes: summary.active_codes,
                used_codes: summary.used_codes,
                total_users: summary.total_users,
            },
            recent_activity: summary.recent_activity,
        }
    }
}

/// Dashboard counters and the ten most recent redemptions.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Summary", body = StatsResponse),
        (status = 401, description = "Admin login required", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminStats"
)]
#[get("/admin/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<StatsResponse>> {
    session.require_admin()?;
    let summary = state.stats.stats().await?;
    Ok(web::Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use serde_json::Value;

    use crate::inbound::http::session::ADMIN_KEY;
    use crate::inbound::http::test_utils::{MockPorts, session_cookie, test_session_middleware};

    #[actix_web::test]
    async fn stats_nest_counters_for_the_dashboard() {
        let mut ports = MockPorts::default();
        ports.stats.expect_stats().returning(|| {
            Ok(AdminStats {
                total_codes: 10,
                active_codes: 7,
                used_codes: 3,
                total_users: 4,
                recent_activity: Vec::new(),
            })
        });
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(ports.into_state()))
                .route(
                    "/login",
                    web::get().to(|session: Session| async move {
                        session.insert(ADMIN_KEY, "root").expect("insert admin");
                        HttpResponse::Ok()
                    }),
                )
                .service(web::scope("/api").service(stats)),
        )
        .await;

        let anonymous =
            test::call_service(&app, test::TestRequest::get().uri("/api/admin/stats").to_request())
                .await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let login = test::call_service(&app, test::TestRequest::get().uri("/login").to_request())
            .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/admin/stats")
                .cookie(session_cookie(&login))
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        insta::assert_json_snapshot!(body, @r###"
        {
          "ok": true,
          "recentActivity": [],
          "stats": {
            "activeCodes": 7,
            "totalCodes": 10,
            "totalUsers": 4,
            "usedCodes": 3
          }
        }
        "###);
    }
}
