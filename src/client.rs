//! Client struct definition
//!
//! The server's end of one open WebSocket: its connection handle and the
//! outbound channel feeding that socket's writer task.

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ConnectionId;

/// Per-socket outbound buffer; a client that stops reading loses messages past this
pub const OUTBOUND_BUFFER_SIZE: usize = 32;

/// Outbound link to a connected socket
///
/// Sends never block: delivery is fire-and-forget, and a message to a
/// socket that went away or is not keeping up is simply lost.
#[derive(Debug)]
pub struct Client {
    /// Connection this link writes to
    pub id: ConnectionId,
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
}

impl Client {
    /// Create a new client with the given ID and sender channel
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self { id, sender }
    }

    /// Queue a message for this client without waiting
    ///
    /// Returns an error if the channel is closed (client disconnected) or
    /// its buffer is full.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => SendError::ChannelFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_send() {
        let (tx, mut rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
        let client = Client::new(ConnectionId::new(), tx);

        client.send(ServerMessage::Waiting).unwrap();
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::Waiting);
    }

    #[test]
    fn test_client_send_after_close() {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
        let client = Client::new(ConnectionId::new(), tx);
        drop(rx);

        assert!(matches!(
            client.send(ServerMessage::StopTyping),
            Err(SendError::ChannelClosed)
        ));
    }

    #[test]
    fn test_slow_reader_drops_overflow() {
        let (tx, mut rx) = mpsc::channel(2);
        let client = Client::new(ConnectionId::new(), tx);

        for text in ["a", "ab", "abc"] {
            let _ = client.send(ServerMessage::Typing {
                text: text.to_string(),
            });
        }
        assert!(matches!(
            client.send(ServerMessage::StopTyping),
            Err(SendError::ChannelFull)
        ));

        // Oldest messages kept in order, overflow gone
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::Typing {
                text: "a".to_string()
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::Typing {
                text: "ab".to_string()
            }
        );
        assert!(rx.try_recv().is_err());

        // Space frees up once the writer catches up
        client.send(ServerMessage::StopTyping).unwrap();
    }
}
