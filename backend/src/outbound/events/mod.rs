//! Tokio broadcast fan-out for live events.
//!
//! One bounded channel per [`LiveScope`]. Publishing never blocks: a receiver
//! that falls more than the channel capacity behind sees `Lagged` and skips
//! ahead.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::ports::{EventPublishError, EventPublisher, EventSubscriber, LiveReceiver};
use crate::domain::{LiveEvent, LiveScope};

/// Events buffered per scope before slow receivers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// In-process event hub implementing both event ports.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    public: broadcast::Sender<LiveEvent>,
    admin: broadcast::Sender<LiveEvent>,
}

impl BroadcastHub {
    /// Create a hub whose channels buffer `capacity` events each.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (public, _) = broadcast::channel(capacity);
        let (admin, _) = broadcast::channel(capacity);
        Self { public, admin }
    }

    fn sender(&self, scope: LiveScope) -> &broadcast::Sender<LiveEvent> {
        match scope {
            LiveScope::Public => &self.public,
            LiveScope::Admin => &self.admin,
        }
    }

    /// Number of open subscriptions for the scope.
    pub fn receiver_count(&self, scope: LiveScope) -> usize {
        self.sender(scope).receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl EventPublisher for BroadcastHub {
    fn publish(&self, scope: LiveScope, event: LiveEvent) -> Result<usize, EventPublishError> {
        let name = event.name();
        // A send error only means nobody is listening.
        let delivered = self.sender(scope).send(event).unwrap_or(0);
        trace!(event = name, ?scope, delivered, "live event published");
        Ok(delivered)
    }
}

impl EventSubscriber for BroadcastHub {
    fn subscribe(&self, scope: LiveScope) -> LiveReceiver {
        self.sender(scope).subscribe()
    }
}
