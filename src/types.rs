//! Basic type definitions for the pairing server
//!
//! Provides newtype wrappers for type safety:
//! - `UserId`: durable identity issued at login
//! - `ConnectionId`: transient handle for one open WebSocket

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique user identity (newtype pattern)
///
/// Issued by `/login` and kept for the process lifetime. Serializes as the
/// bare UUID string so clients can echo it back in `authenticate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live connection handle
///
/// One per accepted WebSocket. Changes on every reconnect, unlike `UserId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
