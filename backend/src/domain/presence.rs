//! In-memory registry of players with open live connections.
//!
//! A player may hold several connections (tabs, devices). The tracker counts
//! distinct players and reports the first-connect and last-disconnect
//! transitions so callers can refresh the dashboard only when the count moves.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::player::PlayerId;

/// Identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Effect of a register or unregister call on the online set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// The player went from zero to one connection.
    Online,
    /// The player's last connection closed.
    Offline,
    /// The distinct player count did not change.
    Unchanged,
}

/// Process-local presence registry.
///
/// # Examples
/// ```
/// use spinwheel::domain::{ConnectionId, PlayerId, PresenceTracker, PresenceTransition};
///
/// let tracker = PresenceTracker::default();
/// let player = PlayerId::random();
/// let conn = ConnectionId::random();
/// assert_eq!(tracker.register(player, conn), PresenceTransition::Online);
/// assert_eq!(tracker.count(), 1);
/// assert_eq!(tracker.unregister(player, conn), PresenceTransition::Offline);
/// ```
#[derive(Debug, Default)]
pub struct PresenceTracker {
    connections: Mutex<HashMap<PlayerId, HashSet<ConnectionId>>>,
}

impl PresenceTracker {
    /// Record an open connection.
    pub fn register(&self, player: PlayerId, connection: ConnectionId) -> PresenceTransition {
        let mut connections = self.lock();
        let open = connections.entry(player).or_default();
        let was_offline = open.is_empty();
        open.insert(connection);
        if was_offline {
            PresenceTransition::Online
        } else {
            PresenceTransition::Unchanged
        }
    }

    /// Record a closed connection; unknown pairs are ignored.
    pub fn unregister(&self, player: PlayerId, connection: ConnectionId) -> PresenceTransition {
        let mut connections = self.lock();
        let Some(open) = connections.get_mut(&player) else {
            return PresenceTransition::Unchanged;
        };
        if !open.remove(&connection) {
            return PresenceTransition::Unchanged;
        }
        if open.is_empty() {
            connections.remove(&player);
            PresenceTransition::Offline
        } else {
            PresenceTransition::Unchanged
        }
    }

    /// Number of distinct online players.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Whether the player has at least one open connection.
    pub fn is_online(&self, player: &PlayerId) -> bool {
        self.lock().contains_key(player)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PlayerId, HashSet<ConnectionId>>> {
        // The map is always left consistent, so a poisoned guard is still usable.
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
