//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization. Field names follow the
//! browser client's camelCase convention.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Client → Server message
///
/// All messages from client to server. Uses tagged enum with snake_case naming.
/// Disconnect has no message; it is the end of the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Bind this connection to an identity issued by `/login`
    ///
    /// Kept as a raw string so a malformed id still earns `auth_failed`
    /// instead of being dropped as invalid JSON.
    #[serde(alias = "auth")]
    Authenticate {
        #[serde(rename = "userId", default)]
        user_id: Option<String>,
    },
    /// Join the waiting pool or get matched
    FindPartner,
    /// Leave the waiting pool
    StopSearch,
    /// Current contents of the sender's input box
    Typing {
        #[serde(default)]
        text: String,
    },
    /// Sender went idle
    StopTyping,
}

impl ClientMessage {
    /// Parse the identity carried by an `authenticate` message
    ///
    /// Returns `None` for missing or non-UUID values.
    pub fn parse_user_id(raw: Option<&str>) -> Option<UserId> {
        raw.and_then(|s| s.trim().parse().ok()).map(UserId)
    }
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection bound to the identity
    AuthOk {
        #[serde(rename = "userId")]
        user_id: UserId,
        username: String,
    },
    /// Identity unknown, client should log in again
    AuthFailed,
    /// Enqueued, no partner available yet
    Waiting,
    /// Matched with a partner
    Paired {
        #[serde(rename = "partnerId")]
        partner_id: UserId,
        #[serde(rename = "partnerName")]
        partner_name: String,
    },
    /// Removed from the waiting pool
    SearchStopped,
    /// Partner's live text
    Typing { text: String },
    /// Partner stopped typing
    StopTyping,
    /// Partner's connection went away; pair dissolved
    PartnerDisconnected,
}

/// `POST /login` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
}

/// `POST /login` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub username: String,
}
