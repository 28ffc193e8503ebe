//! Presence & pairing coordinator
//!
//! Owns the identity registry, connection map, waiting queue and pairing
//! table, and is the only thing that mutates them. Each handler runs to
//! completion and returns the messages it wants delivered; it never does
//! I/O itself, so the whole state machine can be driven in plain unit tests.
//!
//! An event whose connection does not resolve to a user (never
//! authenticated, already disconnected, or superseded by a newer login) is
//! ignored.

use tracing::{debug, error, info, warn};

use crate::connections::ConnectionMap;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::pairing::PairingTable;
use crate::queue::WaitingQueue;
use crate::registry::{IdentityRegistry, User};
use crate::types::{ConnectionId, UserId};

/// One outbound message addressed to a connection
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub message: ServerMessage,
}

impl Delivery {
    pub fn new(to: ConnectionId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}

/// Lifecycle state of a registered user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    /// No live connection bound
    Unauthenticated,
    /// Online, neither searching nor paired
    Idle,
    /// In the waiting queue
    Searching,
    /// Has a partner
    Paired,
}

#[derive(Debug, Default)]
pub struct Coordinator {
    registry: IdentityRegistry,
    connections: ConnectionMap,
    queue: WaitingQueue,
    pairs: PairingTable,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user from the login endpoint
    pub fn register(&mut self, display_name: &str) -> Result<UserId, AppError> {
        let id = self.registry.register(display_name)?;
        debug!("Registered user {} (total users: {})", id, self.registry.len());
        Ok(id)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.registry.lookup(id)
    }

    pub fn state_of(&self, id: UserId) -> Option<UserState> {
        let user = self.registry.lookup(id)?;
        let state = if !user.is_online() {
            UserState::Unauthenticated
        } else if self.pairs.is_paired(id) {
            UserState::Paired
        } else if self.queue.contains(id) {
            UserState::Searching
        } else {
            UserState::Idle
        };
        Some(state)
    }

    /// User currently owning a connection
    pub fn resolve(&self, connection: ConnectionId) -> Option<UserId> {
        self.connections.resolve(connection)
    }

    pub fn partner_of(&self, id: UserId) -> Option<UserId> {
        self.pairs.partner_of(id)
    }

    pub fn user_count(&self) -> usize {
        self.registry.len()
    }

    pub fn online_count(&self) -> usize {
        self.connections.len()
    }

    pub fn waiting_len(&self) -> usize {
        self.queue.len()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Bind a connection to an identity
    ///
    /// A user that was already online on another connection moves to this
    /// one; the old connection is unbound and everything it sends from now
    /// on is ignored. Queue and pair membership carry over, and the client
    /// is told about them right after `auth_ok`.
    pub fn authenticate(&mut self, connection: ConnectionId, id: UserId) -> Vec<Delivery> {
        // Unknown identity changes nothing, not even an existing binding
        if self.registry.lookup(id).is_none() {
            warn!("Authentication failed on {}: unknown identity {}", connection, id);
            return vec![Delivery::new(connection, ServerMessage::AuthFailed)];
        }

        let mut out = Vec::new();

        // Same socket logging in as someone else: retire the previous owner first
        if let Some(previous) = self.connections.resolve(connection) {
            if previous != id {
                out.extend(self.disconnect(connection));
            }
        }

        let superseded = match self.registry.bind_connection(id, connection) {
            Ok(superseded) => superseded,
            Err(err) => {
                error!("Binding {} to {} failed after lookup: {}", id, connection, err);
                out.push(Delivery::new(connection, ServerMessage::AuthFailed));
                return out;
            }
        };

        if let Some(old) = superseded.filter(|old| *old != connection) {
            self.connections.unbind(old);
            info!("User {} moved from connection {} to {}", id, old, connection);
        }
        self.connections.bind(connection, id);

        let username = self.username_of(id);
        info!("User '{}' ({}) authenticated on {}", username, id, connection);
        out.push(Delivery::new(
            connection,
            ServerMessage::AuthOk {
                user_id: id,
                username,
            },
        ));

        if let Some(partner) = self.pairs.partner_of(id) {
            out.push(Delivery::new(connection, self.paired_with(partner)));
        } else if self.queue.contains(id) {
            out.push(Delivery::new(connection, ServerMessage::Waiting));
        }

        out
    }

    /// Match the caller with the longest-waiting user, or start waiting
    pub fn find_partner(&mut self, connection: ConnectionId) -> Vec<Delivery> {
        let Some(me) = self.connections.resolve(connection) else {
            return Vec::new();
        };

        // Already paired: repeat the answer to the caller only
        if let Some(partner) = self.pairs.partner_of(me) {
            return vec![Delivery::new(connection, self.paired_with(partner))];
        }

        let Some(candidate) = self.queue.dequeue_oldest() else {
            self.queue.enqueue(me);
            info!("User {} added to waiting queue", me);
            return vec![Delivery::new(connection, ServerMessage::Waiting)];
        };

        if candidate == me {
            self.queue.enqueue(candidate);
            return Vec::new();
        }

        if let Err(err) = self.pairs.pair(me, candidate) {
            error!("Pairing invariant broken for {} and {}: {}", me, candidate, err);
            debug_assert!(false, "pair() called on an already paired user: {err}");
            self.queue.enqueue(candidate);
            return Vec::new();
        }

        info!(
            "Paired '{}' <-> '{}'",
            self.username_of(me),
            self.username_of(candidate)
        );

        let mut out = vec![Delivery::new(connection, self.paired_with(candidate))];
        match self.registry.connection_of(candidate) {
            Some(candidate_conn) => {
                out.push(Delivery::new(candidate_conn, self.paired_with(me)));
            }
            None => {
                debug!("User {} offline, will learn of pairing on next login", candidate);
            }
        }
        out
    }

    /// Leave the waiting queue; pairs are not affected
    pub fn stop_search(&mut self, connection: ConnectionId) -> Vec<Delivery> {
        let Some(me) = self.connections.resolve(connection) else {
            return Vec::new();
        };

        if self.queue.remove(me) {
            info!("User {} stopped searching", me);
        }
        vec![Delivery::new(connection, ServerMessage::SearchStopped)]
    }

    /// Forward live text to the partner
    pub fn typing(&mut self, connection: ConnectionId, text: String) -> Vec<Delivery> {
        self.forward_to_partner(connection, ServerMessage::Typing { text })
    }

    pub fn stop_typing(&mut self, connection: ConnectionId) -> Vec<Delivery> {
        self.forward_to_partner(connection, ServerMessage::StopTyping)
    }

    /// Tear down everything tied to a closed connection
    ///
    /// The user leaves the queue, any pair is dissolved with the partner
    /// notified (the partner is left idle, not re-queued), and the
    /// connection is unbound. The identity itself is kept.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<Delivery> {
        let Some(me) = self.connections.unbind(connection) else {
            return Vec::new();
        };
        self.registry.clear_connection(me);

        self.queue.remove(me);

        let mut out = Vec::new();
        if let Some(partner) = self.pairs.unpair(me) {
            info!("Pair {} <-> {} dissolved by disconnect", me, partner);
            if let Some(partner_conn) = self.registry.connection_of(partner) {
                out.push(Delivery::new(
                    partner_conn,
                    ServerMessage::PartnerDisconnected,
                ));
            }
        }

        debug!(
            "Online: {}, waiting: {}, pairs: {}",
            self.connections.len(),
            self.queue.len(),
            self.pairs.len()
        );
        out
    }

    /// Route a message to the sender's partner if both ends are live
    fn forward_to_partner(
        &self,
        connection: ConnectionId,
        message: ServerMessage,
    ) -> Vec<Delivery> {
        self.connections
            .resolve(connection)
            .and_then(|me| self.pairs.partner_of(me))
            .and_then(|partner| self.registry.connection_of(partner))
            .map(|partner_conn| Delivery::new(partner_conn, message))
            .into_iter()
            .collect()
    }

    fn paired_with(&self, partner: UserId) -> ServerMessage {
        ServerMessage::Paired {
            partner_id: partner,
            partner_name: self.username_of(partner),
        }
    }

    fn username_of(&self, id: UserId) -> String {
        self.registry
            .lookup(id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }
}
