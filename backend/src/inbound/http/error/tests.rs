//! Tests for HTTP error mapping.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::json;

use super::*;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

async fn render(err: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(err);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("body");
    let payload = serde_json::from_slice(&bytes).expect("error payload");
    (status, header, payload)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("login"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("blocked"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("lost"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_follows_error_code(#[case] err: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), expected);
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_the_trace_id() {
    let err = Error::internal("pool exhausted at db-3")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"host": "db-3"}));

    let (status, header, payload) = render(&err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.details(), None);
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
}

#[rstest]
#[actix_web::test]
async fn rejection_details_reach_the_client() {
    let err = Error::invalid_request("Code already used").with_details(json!({"reason": "used"}));

    let (status, header, payload) = render(&err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(header, None);
    assert_eq!(payload.message(), "Code already used");
    assert_eq!(payload.details(), Some(&json!({"reason": "used"})));
}

#[rstest]
fn actix_errors_become_redacted_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}

mod extractors {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Body {
        #[expect(dead_code, reason = "only deserialisation is exercised")]
        count: u32,
    }

    #[derive(Deserialize)]
    struct Paging {
        #[expect(dead_code, reason = "only deserialisation is exercised")]
        page: u32,
    }

    async fn call(req: test::TestRequest) -> (StatusCode, Error) {
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .configure(configure_extractors)
                    .route(
                        "/json",
                        web::post().to(|_: web::Json<Body>| async { HttpResponse::Ok() }),
                    )
                    .route(
                        "/items/{id}",
                        web::get().to(|_: web::Path<Uuid>| async { HttpResponse::Ok() }),
                    )
                    .route(
                        "/page",
                        web::get().to(|_: web::Query<Paging>| async { HttpResponse::Ok() }),
                    ),
            ),
        )
        .await;
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[rstest]
    #[case(test::TestRequest::post().uri("/api/json").set_payload("{").insert_header(("content-type", "application/json")))]
    #[case(test::TestRequest::post().uri("/api/json").set_payload("count=1").insert_header(("content-type", "text/plain")))]
    #[case(test::TestRequest::get().uri("/api/items/not-a-uuid"))]
    #[case(test::TestRequest::get().uri("/api/page?page=minus-one"))]
    #[actix_web::test]
    async fn extractor_failures_use_the_error_envelope(#[case] req: test::TestRequest) {
        let (status, payload) = call(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    }
}
