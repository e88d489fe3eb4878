//! Port for receiving live events published to a scope.

use tokio::sync::broadcast;

use crate::domain::{LiveEvent, LiveScope};

/// Receiving half of a scope's event channel.
///
/// Slow receivers observe `RecvError::Lagged` and skip ahead rather than
/// blocking publishers.
pub type LiveReceiver = broadcast::Receiver<LiveEvent>;

/// Port for subscribing to live events.
pub trait EventSubscriber: Send + Sync {
    /// Open a new subscription to the scope.
    fn subscribe(&self, scope: LiveScope) -> LiveReceiver;
}
