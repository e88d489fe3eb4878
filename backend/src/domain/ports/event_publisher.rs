//! Port for fanning live events out to subscribers.
//!
//! Publishing is fire-and-forget: callers log failures and carry on, so a
//! broken dashboard connection never fails the operation that emitted the
//! event.

use crate::domain::{LiveEvent, LiveScope};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event publisher adapters.
    pub enum EventPublishError {
        /// The channel for the scope has been shut down.
        Closed { message: String } => "event channel closed: {message}",
    }
}

/// Port for publishing events to a scope.
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    /// Publish an event; returns how many subscribers received it.
    fn publish(&self, scope: LiveScope, event: LiveEvent) -> Result<usize, EventPublishError>;
}

/// Publisher that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEventPublisher;

impl EventPublisher for NoOpEventPublisher {
    fn publish(&self, _scope: LiveScope, _event: LiveEvent) -> Result<usize, EventPublishError> {
        Ok(0)
    }
}
