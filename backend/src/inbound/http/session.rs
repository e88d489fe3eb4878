//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Players and administrators share one cookie session under separate keys,
//! so an operator can test the wheel without dropping their admin login.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::domain::{AdminIdentity, Error, PlayerId, Username};

pub(crate) const PLAYER_KEY: &str = "player";
pub(crate) const ADMIN_KEY: &str = "admin";

/// Player identity stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlayer {
    pub id: PlayerId,
    pub username: Username,
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

fn write_failed(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Remember the signed-in player.
    pub fn persist_player(&self, player: &SessionPlayer) -> Result<(), Error> {
        self.0.insert(PLAYER_KEY, player).map_err(write_failed)
    }

    /// The signed-in player, if any.
    ///
    /// A cookie whose payload no longer decodes is treated as signed out.
    pub fn player(&self) -> Option<SessionPlayer> {
        match self.0.get::<SessionPlayer>(PLAYER_KEY) {
            Ok(player) => player,
            Err(error) => {
                tracing::warn!(%error, "discarding unreadable player session");
                None
            }
        }
    }

    /// Forget the signed-in player, returning who it was.
    pub fn clear_player(&self) -> Option<SessionPlayer> {
        let player = self.player();
        self.0.remove(PLAYER_KEY);
        player
    }

    /// Remember the signed-in administrator.
    pub fn persist_admin(&self, admin: &AdminIdentity) -> Result<(), Error> {
        self.0
            .insert(ADMIN_KEY, admin.username())
            .map_err(write_failed)
    }

    /// Require an administrator session or return `401 Unauthorized`.
    pub fn require_admin(&self) -> Result<AdminIdentity, Error> {
        match self.0.get::<String>(ADMIN_KEY) {
            Ok(Some(username)) => Ok(AdminIdentity::new(username)),
            Ok(None) => Err(Error::unauthorized("Admin login required")),
            Err(error) => {
                tracing::warn!(%error, "discarding unreadable admin session");
                Err(Error::unauthorized("Admin login required"))
            }
        }
    }

    /// Forget the administrator.
    pub fn clear_admin(&self) {
        self.0.remove(ADMIN_KEY);
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    #[actix_web::test]
    async fn player_round_trips_through_the_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_player(&SessionPlayer {
                            id: PlayerId::from_uuid(uuid::Uuid::nil()),
                            username: Username::new("alice").expect("valid"),
                        })?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let name = session
                            .player()
                            .map(|player| player.username.to_string())
                            .unwrap_or_default();
                        HttpResponse::Ok().body(name)
                    }),
                ),
        )
        .await;

        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set.status(), StatusCode::OK);
        let get = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(session_cookie(&set))
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(get).await, "alice");
    }

    #[actix_web::test]
    async fn admin_routes_reject_anonymous_sessions() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/admin",
                    web::get().to(|session: SessionContext| async move {
                        session.require_admin()?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/admin").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_player_payload_reads_as_signed_out() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/tamper",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(PLAYER_KEY, "not-a-player")
                            .expect("insert raw value");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().body(session.player().is_some().to_string())
                    }),
                ),
        )
        .await;

        let set =
            test::call_service(&app, test::TestRequest::get().uri("/tamper").to_request()).await;
        let get = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(session_cookie(&set))
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(get).await, "false");
    }
}
