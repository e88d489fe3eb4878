//! Per-connection live channel.
//!
//! Relays broadcast events to the client and keeps framing and heartbeats
//! at the edge. The server pings every 5s and drops a connection after 10s
//! without client traffic. A signed-in player is registered with the
//! presence port for the lifetime of the connection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::broadcast::error::RecvError;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::ports::{LivePresence, LiveReceiver};
use crate::domain::{ConnectionId, LiveEvent, PlayerId};
use crate::inbound::ws::messages::LiveFrame;

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
pub(crate) const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
pub(crate) const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
pub(crate) const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
pub(crate) const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
    FeedClosed,
}

/// Presence registration held by a player connection.
pub(crate) struct PresenceLease {
    pub(crate) presence: Arc<dyn LivePresence>,
    pub(crate) player: PlayerId,
    pub(crate) connection: ConnectionId,
}

/// One open live connection.
pub(crate) struct LiveSession {
    events: LiveReceiver,
    lease: Option<PresenceLease>,
    greeting: Option<LiveFrame>,
}

impl LiveSession {
    pub(crate) fn new(events: LiveReceiver) -> Self {
        Self {
            events,
            lease: None,
            greeting: None,
        }
    }

    /// Register the player as online while the connection is open.
    pub(crate) fn with_presence(mut self, lease: PresenceLease) -> Self {
        self.lease = Some(lease);
        self
    }

    /// Frame sent before any relayed event.
    pub(crate) fn with_greeting(mut self, frame: LiveFrame) -> Self {
        self.greeting = Some(frame);
        self
    }

    pub(crate) async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        if let Some(lease) = &self.lease {
            lease.presence.connected(lease.player, lease.connection).await;
        }

        let outcome = match self.greeting.take() {
            Some(frame) => send_frame(&mut session, &frame)
                .await
                .map_err(SessionError::Network),
            None => Ok(()),
        };
        let error = match outcome {
            Ok(()) => self.pump(&mut session, &mut stream).await,
            Err(error) => error,
        };

        log_shutdown_reason(&error);
        if let Some(reason) = close_reason_for(error) {
            if let Err(error) = session.close(reason).await {
                debug!(error = %error, "WebSocket already closed");
            }
        }

        if let Some(lease) = &self.lease {
            lease.presence.disconnected(lease.player, lease.connection).await;
        }
    }

    async fn pump(&mut self, session: &mut Session, stream: &mut MessageStream) -> SessionError {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => handle_heartbeat_tick(session, &last_heartbeat).await,
                message = stream.recv() => {
                    handle_stream_message(session, &mut last_heartbeat, message).await
                }
                event = self.events.recv() => handle_event(session, event).await,
            };
            if let Err(error) = result {
                return error;
            }
        }
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: &Instant,
) -> Result<(), SessionError> {
    if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }
    session.ping(b"").await.map_err(SessionError::Network)
}

async fn handle_stream_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionError> {
    let Some(message) = message else {
        return Err(SessionError::StreamClosed);
    };
    match message.map_err(SessionError::Protocol)? {
        Message::Ping(payload) => {
            *last_heartbeat = Instant::now();
            session.pong(&payload).await.map_err(SessionError::Network)
        }
        Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        Message::Text(_)
        | Message::Pong(_)
        | Message::Binary(_)
        | Message::Continuation(_)
        | Message::Nop => {
            *last_heartbeat = Instant::now();
            Ok(())
        }
    }
}

async fn handle_event(
    session: &mut Session,
    event: Result<LiveEvent, RecvError>,
) -> Result<(), SessionError> {
    match event {
        Ok(event) => match LiveFrame::try_from(&event) {
            Ok(frame) => send_frame(session, &frame)
                .await
                .map_err(SessionError::Network),
            Err(error) => {
                warn!(error = %error, event = event.name(), "Failed to serialize live event");
                Ok(())
            }
        },
        Err(RecvError::Lagged(skipped)) => {
            warn!(skipped, "Live connection lagged; skipping missed events");
            Ok(())
        }
        Err(RecvError::Closed) => Err(SessionError::FeedClosed),
    }
}

async fn send_frame(session: &mut Session, frame: &LiveFrame) -> Result<(), Closed> {
    match serde_json::to_string(frame) {
        Ok(body) => session.text(body).await,
        Err(error) => {
            warn!(error = %error, event = frame.event, "Failed to serialize live frame");
            Ok(())
        }
    }
}

fn log_shutdown_reason(error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!("WebSocket heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(error = %error, "WebSocket protocol error");
        }
        SessionError::Network(error) => {
            debug!(error = %error, "WebSocket send failed; closing connection");
        }
        SessionError::FeedClosed => {
            warn!("Live event feed closed; closing connection");
        }
        SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
    }
}

fn close_reason_for(error: SessionError) -> Option<Option<CloseReason>> {
    match error {
        SessionError::HeartbeatTimeout => Some(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::Protocol(_) => Some(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::FeedClosed => Some(Some(CloseReason {
            code: CloseCode::Away,
            description: Some("server shutting down".to_owned()),
        })),
        SessionError::ClientClosed(reason) => Some(reason),
        SessionError::StreamClosed | SessionError::Network(_) => None,
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
