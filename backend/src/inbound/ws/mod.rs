//! WebSocket inbound adapter bridging live events to clients.
//!
//! Responsibilities:
//! - validate upgrade requests against the origin allow-list
//! - register signed-in players with the presence port
//! - relay public or admin events as `{event, data}` frames

use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get, http::header::ORIGIN};
use tracing::error;

use crate::domain::{ConnectionId, LiveScope, TraceId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::ws::messages::LiveFrame;
use crate::inbound::ws::session::{LiveSession, PresenceLease};
use crate::inbound::ws::state::WsState;

pub mod messages;
pub mod origin;
mod session;
pub mod state;

fn check_origin(state: &WsState, req: &HttpRequest) -> actix_web::Result<()> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }
    state.origins.validate(origin_header)
}

fn upgrade(
    req: &HttpRequest,
    stream: Payload,
    live: LiveSession,
) -> actix_web::Result<HttpResponse> {
    let (response, session, messages) = actix_ws::handle(req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;
    actix_web::rt::spawn(TraceId::propagate(live.run(session, messages)));
    Ok(response)
}

/// Public live channel; a signed-in player counts as online while connected.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    session: SessionContext,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    check_origin(&state, &req)?;
    let mut live = LiveSession::new(state.events.subscribe(LiveScope::Public));
    if let Some(player) = session.player() {
        live = live.with_presence(PresenceLease {
            presence: state.presence.clone(),
            player: player.id,
            connection: ConnectionId::random(),
        });
    }
    upgrade(&req, stream, live)
}

/// Admin live channel: the current counters, then every admin event.
#[get("/ws/admin")]
pub async fn admin_ws_entry(
    state: web::Data<WsState>,
    session: SessionContext,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    check_origin(&state, &req)?;
    session.require_admin()?;
    // Subscribe before reading the snapshot so no event between the two is lost.
    let events = state.events.subscribe(LiveScope::Admin);
    let snapshot = state.presence.snapshot().await?;
    let greeting = LiveFrame::kpi(snapshot).map_err(|error| {
        error!(error = %error, "Failed to serialize KPI snapshot");
        actix_web::error::ErrorInternalServerError("Internal server error")
    })?;
    upgrade(&req, stream, LiveSession::new(events).with_greeting(greeting))
}
