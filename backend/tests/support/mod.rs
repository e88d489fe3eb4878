//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates, so each suite pulls this
//! module in with `mod support;` and uses only the helpers it needs.

#![expect(
    dead_code,
    reason = "each integration suite compiles this module and uses a subset of it"
)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web};
use chrono::Utc;
use serde_json::{Value, json};
use spinwheel::domain::ports::CodeRepository;
use spinwheel::domain::{AdminCredentials, CodeValue, SpinCode};
use spinwheel::inbound::http::health::HealthState;
use spinwheel::outbound::events::BroadcastHub;
use spinwheel::outbound::memory::InMemoryStore;
use spinwheel::server::{AdapterStates, AppDependencies, Repositories, ServiceOptions, build_app, build_states};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// In-memory application wiring plus direct access to its store.
pub struct TestBackend {
    pub store: Arc<InMemoryStore>,
    pub states: AdapterStates,
}

impl TestBackend {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let repos = Repositories::in_memory(store.clone());
        let admin = AdminCredentials::try_from_parts(ADMIN_USERNAME, ADMIN_PASSWORD)
            .expect("valid admin credentials");
        let states = build_states(&repos, Arc::new(BroadcastHub::default()), ServiceOptions::new(admin));
        Self { store, states }
    }

    pub fn dependencies(&self) -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new("memory")),
            http_state: web::Data::new(self.states.http.clone()),
            ws_state: web::Data::new(self.states.ws.clone()),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Store a fresh active code.
    pub async fn seed_code(&self, code: &str) -> SpinCode {
        let code = SpinCode::issue(CodeValue::parse(code).expect("valid code"), Utc::now());
        self.store
            .insert_batch(std::slice::from_ref(&code))
            .await
            .expect("insert code");
        code
    }

    pub async fn stored_code(&self, code: &str) -> SpinCode {
        self.store
            .find_by_code(&CodeValue::parse(code).expect("valid code"))
            .await
            .expect("lookup code")
            .expect("code stored")
    }
}

/// Initialise the full application around `backend`.
pub async fn init_app(
    backend: &TestBackend,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(build_app(backend.dependencies())).await
}

/// The session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

pub async fn login_player<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "username": username }))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "player login failed");
    session_cookie(&response)
}

pub async fn login_admin<S>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/admin/auth/login")
            .set_json(json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "admin login failed");
    session_cookie(&response)
}

/// POST a spin and return the status with the decoded body.
pub async fn spin<S>(app: &S, code: &str, username: &str) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/game/spin")
            .set_json(json!({ "code": code, "username": username }))
            .to_request(),
    )
    .await;
    let status = response.status().as_u16();
    (status, test::read_body_json(response).await)
}

/// Render a `postgres` error with the server message and SQLSTATE when present.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}
