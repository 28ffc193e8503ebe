//! Connection map
//!
//! Inverse of the registry's live link: resolves the connection an event
//! arrived on to the user that owns it.

use std::collections::HashMap;

use crate::types::{ConnectionId, UserId};

/// ConnectionId -> UserId for authenticated connections
#[derive(Debug, Default)]
pub struct ConnectionMap {
    owners: HashMap<ConnectionId, UserId>,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, connection: ConnectionId, id: UserId) {
        self.owners.insert(connection, id);
    }

    /// Forget a connection, returning its former owner
    pub fn unbind(&mut self, connection: ConnectionId) -> Option<UserId> {
        self.owners.remove(&connection)
    }

    pub fn resolve(&self, connection: ConnectionId) -> Option<UserId> {
        self.owners.get(&connection).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
