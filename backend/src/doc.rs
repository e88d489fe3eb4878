//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint under `/api`, the health probes,
//! and the session cookie security scheme. Schemas referenced by the paths
//! are collected automatically; the error envelope is listed explicitly so
//! clients can rely on its name.
//!
//! The document is served by Swagger UI in debug builds and exported via
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login or POST /api/admin/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Spinwheel API",
        description = "Code redemption, prize administration and health probes.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::player_login,
        crate::inbound::http::auth::player_logout,
        crate::inbound::http::auth::admin_login,
        crate::inbound::http::auth::admin_logout,
        crate::inbound::http::auth::admin_me,
        crate::inbound::http::game::spin,
        crate::inbound::http::game::history,
        crate::inbound::http::prizes::public_prizes,
        crate::inbound::http::prizes::default_prizes,
        crate::inbound::http::prizes::list_prizes,
        crate::inbound::http::prizes::list_active_prizes,
        crate::inbound::http::prizes::create_prize,
        crate::inbound::http::prizes::update_probabilities,
        crate::inbound::http::prizes::update_prize,
        crate::inbound::http::prizes::delete_prize,
        crate::inbound::http::prizes::seed_prizes,
        crate::inbound::http::codes::generate_codes,
        crate::inbound::http::codes::list_codes,
        crate::inbound::http::codes::disable_code,
        crate::inbound::http::codes::enable_code,
        crate::inbound::http::codes::list_logs,
        crate::inbound::http::stats::stats,
        crate::inbound::http::users::list_players,
        crate::inbound::http::users::get_player,
        crate::inbound::http::users::toggle_player_block,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "auth", description = "Player and admin sign-in"),
        (name = "game", description = "Code redemption and spin history"),
        (name = "admin", description = "Code, prize, player and statistics management"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
