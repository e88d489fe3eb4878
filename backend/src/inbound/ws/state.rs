//! Shared WebSocket adapter state.
//!
//! WebSocket entry points depend on domain ports rather than concrete
//! services, so tests can drive them with doubles.

use std::sync::Arc;

use crate::domain::ports::{EventSubscriber, LivePresence};
use crate::inbound::ws::origin::OriginPolicy;

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub presence: Arc<dyn LivePresence>,
    pub events: Arc<dyn EventSubscriber>,
    pub origins: Arc<OriginPolicy>,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(
        presence: Arc<dyn LivePresence>,
        events: Arc<dyn EventSubscriber>,
        origins: OriginPolicy,
    ) -> Self {
        Self {
            presence,
            events,
            origins: Arc::new(origins),
        }
    }
}
