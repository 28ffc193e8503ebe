//! ChatServer Actor implementation
//!
//! The single task that owns the pairing coordinator and the outbound link of
//! every open connection. Commands arrive over an mpsc channel and are
//! handled one at a time, so no two handlers ever interleave and queue
//! matching is strictly FIFO.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::client::Client;
use crate::coordinator::{Coordinator, Delivery};
use crate::error::AppError;
use crate::message::{LoginResponse, ServerMessage};
use crate::types::{ConnectionId, UserId};

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Register a display name (from `POST /login`)
    Login {
        username: String,
        reply: oneshot::Sender<Result<LoginResponse, AppError>>,
    },
    /// WebSocket opened
    Connect {
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// WebSocket closed
    Disconnect {
        connection_id: ConnectionId,
    },
    /// Bind the connection to an identity (`None` for a malformed id)
    Authenticate {
        connection_id: ConnectionId,
        user_id: Option<UserId>,
    },
    /// Look for a partner
    FindPartner {
        connection_id: ConnectionId,
    },
    /// Leave the waiting queue
    StopSearch {
        connection_id: ConnectionId,
    },
    /// Live text for the partner
    Typing {
        connection_id: ConnectionId,
        text: String,
    },
    /// Typing stopped
    StopTyping {
        connection_id: ConnectionId,
    },
}

/// The main ChatServer actor
pub struct ChatServer {
    /// Pairing state
    coordinator: Coordinator,
    /// Open sockets: ConnectionId -> Client
    clients: HashMap<ConnectionId, Client>,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            coordinator: Coordinator::new(),
            clients: HashMap::new(),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        let deliveries = match cmd {
            ServerCommand::Login { username, reply } => {
                self.handle_login(&username, reply);
                return;
            }
            ServerCommand::Connect {
                connection_id,
                sender,
            } => {
                self.handle_connect(connection_id, sender);
                return;
            }
            ServerCommand::Disconnect { connection_id } => self.handle_disconnect(connection_id),
            ServerCommand::Authenticate {
                connection_id,
                user_id,
            } => match user_id {
                Some(user_id) => self.coordinator.authenticate(connection_id, user_id),
                None => vec![Delivery::new(connection_id, ServerMessage::AuthFailed)],
            },
            ServerCommand::FindPartner { connection_id } => {
                self.coordinator.find_partner(connection_id)
            }
            ServerCommand::StopSearch { connection_id } => {
                self.coordinator.stop_search(connection_id)
            }
            ServerCommand::Typing {
                connection_id,
                text,
            } => self.coordinator.typing(connection_id, text),
            ServerCommand::StopTyping { connection_id } => {
                self.coordinator.stop_typing(connection_id)
            }
        };

        self.deliver(deliveries);
    }

    /// Handle login: register the name and answer the HTTP handler
    fn handle_login(
        &mut self,
        username: &str,
        reply: oneshot::Sender<Result<LoginResponse, AppError>>,
    ) {
        let result = self.coordinator.register(username).map(|user_id| {
            let username = self
                .coordinator
                .user(user_id)
                .map(|u| u.username.clone())
                .unwrap_or_default();
            info!("User '{}' logged in as {}", username, user_id);
            LoginResponse { user_id, username }
        });

        // Requester may have given up; nothing to do then
        let _ = reply.send(result);
    }

    /// Handle new socket
    fn handle_connect(
        &mut self,
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    ) {
        info!("Connection {} opened", connection_id);
        self.clients
            .insert(connection_id, Client::new(connection_id, sender));
        debug!(
            "Open connections: {}, registered users: {}",
            self.clients.len(),
            self.coordinator.user_count()
        );
    }

    /// Handle socket close
    fn handle_disconnect(&mut self, connection_id: ConnectionId) -> Vec<Delivery> {
        info!("Connection {} closed", connection_id);

        self.clients.remove(&connection_id);
        let deliveries = self.coordinator.disconnect(connection_id);

        debug!(
            "Open connections: {}, waiting: {}, pairs: {}",
            self.clients.len(),
            self.coordinator.waiting_len(),
            self.coordinator.pair_count()
        );
        deliveries
    }

    /// Fire-and-forget delivery; closed, full or unknown sockets drop the message
    fn deliver(&self, deliveries: Vec<Delivery>) {
        for Delivery { to, message } in deliveries {
            match self.clients.get(&to) {
                Some(client) => {
                    if let Err(e) = client.send(message) {
                        debug!("Dropped message for connection {}: {}", client.id, e);
                    }
                }
                None => debug!("Dropped message for unknown connection {}", to),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::OUTBOUND_BUFFER_SIZE;

    /// Spawn the actor and return its command sender
    fn spawn_server() -> mpsc::Sender<ServerCommand> {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(ChatServer::new(rx).run());
        tx
    }

    async fn login(tx: &mpsc::Sender<ServerCommand>, name: &str) -> Result<LoginResponse, AppError> {
        let (reply, rx) = oneshot::channel();
        tx.send(ServerCommand::Login {
            username: name.to_string(),
            reply,
        })
        .await
        .unwrap();
        rx.await.unwrap()
    }

    async fn connect(
        tx: &mpsc::Sender<ServerCommand>,
    ) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        let connection_id = ConnectionId::new();
        let (sender, rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
        tx.send(ServerCommand::Connect {
            connection_id,
            sender,
        })
        .await
        .unwrap();
        (connection_id, rx)
    }

    #[tokio::test]
    async fn test_login_trims_name() {
        let tx = spawn_server();
        let response = login(&tx, "  alice  ").await.unwrap();
        assert_eq!(response.username, "alice");
    }

    #[tokio::test]
    async fn test_login_blank_name() {
        let tx = spawn_server();
        assert!(matches!(login(&tx, " ").await, Err(AppError::InvalidInput)));
    }

    #[tokio::test]
    async fn test_malformed_id_gets_auth_failed() {
        let tx = spawn_server();
        let (connection_id, mut rx) = connect(&tx).await;

        tx.send(ServerCommand::Authenticate {
            connection_id,
            user_id: None,
        })
        .await
        .unwrap();

        assert_eq!(rx.recv().await.unwrap(), ServerMessage::AuthFailed);
    }

    #[tokio::test]
    async fn test_pairing_through_actor() {
        let tx = spawn_server();
        let alice = login(&tx, "alice").await.unwrap();
        let bob = login(&tx, "bob").await.unwrap();
        let (a_conn, mut a_rx) = connect(&tx).await;
        let (b_conn, mut b_rx) = connect(&tx).await;

        for (connection_id, user) in [(a_conn, &alice), (b_conn, &bob)] {
            tx.send(ServerCommand::Authenticate {
                connection_id,
                user_id: Some(user.user_id),
            })
            .await
            .unwrap();
        }
        assert!(matches!(a_rx.recv().await, Some(ServerMessage::AuthOk { .. })));
        assert!(matches!(b_rx.recv().await, Some(ServerMessage::AuthOk { .. })));

        tx.send(ServerCommand::FindPartner {
            connection_id: a_conn,
        })
        .await
        .unwrap();
        assert_eq!(a_rx.recv().await.unwrap(), ServerMessage::Waiting);

        tx.send(ServerCommand::FindPartner {
            connection_id: b_conn,
        })
        .await
        .unwrap();
        assert_eq!(
            b_rx.recv().await.unwrap(),
            ServerMessage::Paired {
                partner_id: alice.user_id,
                partner_name: "alice".to_string()
            }
        );
        assert_eq!(
            a_rx.recv().await.unwrap(),
            ServerMessage::Paired {
                partner_id: bob.user_id,
                partner_name: "bob".to_string()
            }
        );

        tx.send(ServerCommand::Disconnect {
            connection_id: a_conn,
        })
        .await
        .unwrap();
        assert_eq!(
            b_rx.recv().await.unwrap(),
            ServerMessage::PartnerDisconnected
        );

        // Actor dropped alice's link, closing her channel
        assert!(a_rx.recv().await.is_none());
    }
}
