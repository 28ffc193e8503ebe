//! Identity registry
//!
//! Issues user identities at login and remembers each user's current live
//! connection. Users are never removed.

use std::collections::HashMap;

use crate::error::AppError;
use crate::types::{ConnectionId, UserId};

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identity issued at login
    pub id: UserId,
    /// Trimmed, non-empty display name
    pub username: String,
    /// Currently bound connection (None when offline)
    pub connection: Option<ConnectionId>,
}

impl User {
    /// Check if this user has a live connection
    pub fn is_online(&self) -> bool {
        self.connection.is_some()
    }
}

/// UserId -> User
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    users: HashMap<UserId, User>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user under a fresh identity
    ///
    /// Fails with `InvalidInput` if the name is empty after trimming.
    /// Display names are not required to be unique.
    pub fn register(&mut self, display_name: &str) -> Result<UserId, AppError> {
        let username = display_name.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput);
        }

        let id = UserId::new();
        self.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                connection: None,
            },
        );
        Ok(id)
    }

    pub fn lookup(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Attach a live connection to a user
    ///
    /// Overwrites any previous handle and returns it so the caller can
    /// retire the superseded connection.
    pub fn bind_connection(
        &mut self,
        id: UserId,
        connection: ConnectionId,
    ) -> Result<Option<ConnectionId>, AppError> {
        let user = self
            .users
            .get_mut(&id)
            .ok_or(AppError::UnknownIdentity(id))?;
        Ok(user.connection.replace(connection))
    }

    /// Detach the user's live connection (no-op if unknown or offline)
    pub fn clear_connection(&mut self, id: UserId) {
        if let Some(user) = self.users.get_mut(&id) {
            user.connection = None;
        }
    }

    /// Live connection for a user, if any
    pub fn connection_of(&self, id: UserId) -> Option<ConnectionId> {
        self.users.get(&id).and_then(|u| u.connection)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_lookup() {
        let mut registry = IdentityRegistry::new();
        let id = registry.register("  alice ").unwrap();

        let user = registry.lookup(id).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert!(user.connection.is_none());
        assert!(!user.is_online());
    }

    #[test]
    fn test_register_rejects_blank_names() {
        let mut registry = IdentityRegistry::new();
        assert!(matches!(registry.register(""), Err(AppError::InvalidInput)));
        assert!(matches!(registry.register(" \t\n"), Err(AppError::InvalidInput)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_names_get_distinct_ids() {
        let mut registry = IdentityRegistry::new();
        let a = registry.register("sam").unwrap();
        let b = registry.register("sam").unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_bind_connection_overwrites() {
        let mut registry = IdentityRegistry::new();
        let id = registry.register("alice").unwrap();
        let first = ConnectionId::new();
        let second = ConnectionId::new();

        assert_eq!(registry.bind_connection(id, first).unwrap(), None);
        assert_eq!(registry.bind_connection(id, second).unwrap(), Some(first));
        assert_eq!(registry.connection_of(id), Some(second));
    }

    #[test]
    fn test_bind_unknown_identity() {
        let mut registry = IdentityRegistry::new();
        let result = registry.bind_connection(UserId::new(), ConnectionId::new());
        assert!(matches!(result, Err(AppError::UnknownIdentity(_))));
    }

    #[test]
    fn test_clear_connection() {
        let mut registry = IdentityRegistry::new();
        let id = registry.register("alice").unwrap();
        registry.bind_connection(id, ConnectionId::new()).unwrap();

        registry.clear_connection(id);
        assert!(registry.connection_of(id).is_none());

        // Repeated and unknown clears are harmless
        registry.clear_connection(id);
        registry.clear_connection(UserId::new());
        assert!(registry.lookup(id).is_some());
    }
}
