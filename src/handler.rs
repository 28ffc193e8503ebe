//! WebSocket connection handler
//!
//! Handles one upgraded WebSocket: message parsing and bidirectional
//! communication with the ChatServer. Each socket is a single ordered
//! channel in both directions, which is what keeps a partner's `typing` and
//! `stop_typing` in the order they were sent.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::client::OUTBOUND_BUFFER_SIZE;
use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::server::ServerCommand;
use crate::types::ConnectionId;

/// Drive an upgraded WebSocket until either side goes away
///
/// Registers the socket with the ChatServer, pumps frames both ways, and
/// always reports the disconnect on the way out.
pub async fn handle_connection(
    socket: WebSocket,
    cmd_tx: mpsc::Sender<ServerCommand>,
    peer_addr: String,
) -> Result<(), AppError> {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();
    info!("Connection {} opened from {}", connection_id, peer_addr);

    // Channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_BUFFER_SIZE);

    if cmd_tx
        .send(ServerCommand::Connect {
            connection_id,
            sender: msg_tx,
        })
        .await
        .is_err()
    {
        error!("Failed to register connection {} - server closed", connection_id);
        return Err(AppError::ChannelSend);
    }

    let cmd_tx_read = cmd_tx.clone();

    // Read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        let cmd = client_message_to_command(connection_id, client_msg);
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Server closed, ending read task for {}", connection_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid JSON from {}: {}", connection_id, e);
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", connection_id);
                    break;
                }
                Ok(_) => {
                    // Binary, ping and pong frames carry nothing for us
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", connection_id);
    });

    // Write task (ServerMessage -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
        debug!("Write task ended for {}", connection_id);

        let _ = ws_sender.close().await;
    });

    // Whichever side finishes first takes the other down with it
    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
        }
        _ = &mut write_task => {
            read_task.abort();
        }
    }

    let _ = cmd_tx
        .send(ServerCommand::Disconnect { connection_id })
        .await;

    info!("Connection {} from {} closed", connection_id, peer_addr);

    Ok(())
}

/// Convert a ClientMessage to a ServerCommand
fn client_message_to_command(connection_id: ConnectionId, msg: ClientMessage) -> ServerCommand {
    match msg {
        ClientMessage::Authenticate { user_id } => ServerCommand::Authenticate {
            connection_id,
            user_id: ClientMessage::parse_user_id(user_id.as_deref()),
        },
        ClientMessage::FindPartner => ServerCommand::FindPartner { connection_id },
        ClientMessage::StopSearch => ServerCommand::StopSearch { connection_id },
        ClientMessage::Typing { text } => ServerCommand::Typing {
            connection_id,
            text,
        },
        ClientMessage::StopTyping => ServerCommand::StopTyping { connection_id },
    }
}
