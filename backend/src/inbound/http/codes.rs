//! Admin spin-code management endpoints.
//!
//! ```text
//! POST /api/admin/spin-codes/generate {"count":10,"prefix":"VIP"}
//! GET /api/admin/spin-codes?status=active&search=VIP&page=1&limit=20
//! PUT /api/admin/spin-codes/{id}/disable
//! PUT /api/admin/spin-codes/{id}/enable
//! GET /api/admin/spin-codes/logs?range=7d
//! ```

use actix_web::{get, post, put, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{CodeListRequest, GenerateCodesRequest, SpinLogListRequest};
use crate::domain::{CodeValue, Error, Page, SpinCode, SpinLog};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Codes stored by a generate call.
#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedCodesResponse {
    pub ok: bool,
    pub count: usize,
    pub codes: Vec<CodeValue>,
}

/// One page of items with the unpaged total.
#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse<T> {
    pub ok: bool,
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            ok: true,
            items: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

/// A code after a status change.
#[derive(Debug, Serialize, ToSchema)]
pub struct CodeResponse {
    pub ok: bool,
    pub code: SpinCode,
}

/// Generate a batch of random codes.
#[utoipa::path(
    post,
    path = "/api/admin/spin-codes/generate",
    request_body = GenerateCodesRequest,
    responses(
        (status = 200, description = "Codes stored", body = GeneratedCodesResponse),
        (status = 400, description = "Prefix leaves no room for random characters", body = Error),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "generateCodes"
)]
#[post("/admin/spin-codes/generate")]
pub async fn generate_codes(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GenerateCodesRequest>,
) -> ApiResult<web::Json<GeneratedCodesResponse>> {
    let admin = session.require_admin()?;
    let mut request = payload.into_inner();
    request.created_by = Some(admin.username().to_owned());
    let codes: Vec<CodeValue> = state
        .codes
        .generate(request)
        .await?
        .into_iter()
        .map(|code| code.code)
        .collect();
    Ok(web::Json(GeneratedCodesResponse {
        ok: true,
        count: codes.len(),
        codes,
    }))
}

/// List codes newest first.
#[utoipa::path(
    get,
    path = "/api/admin/spin-codes",
    params(CodeListRequest),
    responses(
        (status = 200, description = "Codes", body = PageResponse<SpinCode>),
        (status = 400, description = "Unknown status filter", body = Error),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listCodes"
)]
#[get("/admin/spin-codes")]
pub async fn list_codes(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CodeListRequest>,
) -> ApiResult<web::Json<PageResponse<SpinCode>>> {
    session.require_admin()?;
    let page = state.codes.list(query.into_inner()).await?;
    Ok(web::Json(page.into()))
}

/// Disable a code.
#[utoipa::path(
    put,
    path = "/api/admin/spin-codes/{id}/disable",
    params(("id" = Uuid, Path, description = "Code identifier")),
    responses(
        (status = 200, description = "Code disabled", body = CodeResponse),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Code not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "disableCode"
)]
#[put("/admin/spin-codes/{id}/disable")]
pub async fn disable_code(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<CodeResponse>> {
    session.require_admin()?;
    let code = state.codes.disable(&id).await?;
    Ok(web::Json(CodeResponse { ok: true, code }))
}

/// Re-activate a code that was never redeemed.
#[utoipa::path(
    put,
    path = "/api/admin/spin-codes/{id}/enable",
    params(("id" = Uuid, Path, description = "Code identifier")),
    responses(
        (status = 200, description = "Code enabled", body = CodeResponse),
        (status = 400, description = "Code was already used", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Code not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "enableCode"
)]
#[put("/admin/spin-codes/{id}/enable")]
pub async fn enable_code(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<CodeResponse>> {
    session.require_admin()?;
    let code = state.codes.enable(&id).await?;
    Ok(web::Json(CodeResponse { ok: true, code }))
}

/// Redemption log with date range and search filters.
#[utoipa::path(
    get,
    path = "/api/admin/spin-codes/logs",
    params(SpinLogListRequest),
    responses(
        (status = 200, description = "Spin logs", body = PageResponse<SpinLog>),
        (status = 400, description = "Unknown range", body = Error),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listSpinLogs"
)]
#[get("/admin/spin-codes/logs")]
pub async fn list_logs(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SpinLogListRequest>,
) -> ApiResult<web::Json<PageResponse<SpinLog>>> {
    session.require_admin()?;
    let page = state.history.logs(query.into_inner()).await?;
    Ok(web::Json(page.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::Session;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use serde_json::{Value, json};

    use crate::domain::test_support::fixture_timestamp;
    use crate::domain::{CodeStatus, PageRequest};
    use crate::inbound::http::session::ADMIN_KEY;
    use crate::inbound::http::test_utils::{MockPorts, session_cookie, test_session_middleware};

    fn code(value: &str) -> SpinCode {
        SpinCode::issue(CodeValue::parse(value).expect("valid code"), fixture_timestamp())
    }

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
                            .service(generate_codes)
                            .service(list_logs)
                            .service(list_codes)
                            .service(disable_code)
                            .service(enable_code),
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
    async fn generate_stamps_the_admin_and_returns_values() {
        let mut ports = MockPorts::default();
        ports
            .codes
            .expect_generate()
            .withf(|request| {
                request.created_by.as_deref() == Some("root") && request.count == Some(2)
            })
            .returning(|_| Ok(vec![code("VIPAB12"), code("VIPCD34")]));
        let app = app!(ports);
        let cookie = admin_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/spin-codes/generate")
                .cookie(cookie)
                .set_json(json!({"count": 2, "prefix": "vip"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"ok": true, "count": 2, "codes": ["VIPAB12", "VIPCD34"]}));
    }

    #[actix_web::test]
    async fn created_by_cannot_be_smuggled_in_the_body() {
        let mut ports = MockPorts::default();
        ports
            .codes
            .expect_generate()
            .withf(|request| request.created_by.as_deref() == Some("root"))
            .returning(|_| Ok(Vec::new()));
        let app = app!(ports);
        let cookie = admin_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/spin-codes/generate")
                .cookie(cookie)
                .set_json(json!({"createdBy": "mallory"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn anonymous_requests_are_rejected() {
        let app = app!(MockPorts::default());
        for request in [
            test::TestRequest::get().uri("/api/admin/spin-codes"),
            test::TestRequest::get().uri("/api/admin/spin-codes/logs"),
            test::TestRequest::put().uri(&format!(
                "/api/admin/spin-codes/{}/disable",
                Uuid::nil()
            )),
        ] {
            let res = test::call_service(&app, request.to_request()).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[actix_web::test]
    async fn list_forwards_filters_and_pages() {
        let mut ports = MockPorts::default();
        ports
            .codes
            .expect_list()
            .withf(|request| {
                request.status.as_deref() == Some("active")
                    && request.search.as_deref() == Some("vip")
                    && request.page == Some(2)
            })
            .returning(|_| {
                Ok(Page::new(
                    vec![code("VIPAB12")],
                    21,
                    PageRequest::new(Some(2), Some(20)),
                ))
            });
        let app = app!(ports);
        let cookie = admin_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/admin/spin-codes?status=active&search=vip&page=2&limit=20")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["total"], 21);
        assert_eq!(body["page"], 2);
        assert_eq!(body["items"][0]["code"], "VIPAB12");
    }

    #[actix_web::test]
    async fn enabling_a_used_code_is_a_bad_request() {
        let mut ports = MockPorts::default();
        ports
            .codes
            .expect_enable()
            .returning(|_| Err(Error::invalid_request("Cannot enable a used code")));
        ports.codes.expect_disable().returning(|_| {
            let mut disabled = code("TEST001");
            disabled.status = CodeStatus::Disabled;
            Ok(disabled)
        });
        let app = app!(ports);
        let cookie = admin_cookie(&app).await;
        let id = Uuid::nil();

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/admin/spin-codes/{id}/enable"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/admin/spin-codes/{id}/disable"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"]["status"], "disabled");
    }

    #[actix_web::test]
    async fn logs_forward_the_range() {
        let mut ports = MockPorts::default();
        ports
            .history
            .expect_logs()
            .withf(|request| request.range.as_deref() == Some("7d"))
            .returning(|_| Ok(Page::new(Vec::new(), 0, PageRequest::default())));
        let app = app!(ports);
        let cookie = admin_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/admin/spin-codes/logs?range=7d")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["items"], json!([]));
    }
}
