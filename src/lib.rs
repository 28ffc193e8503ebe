//! Anonymous 1:1 Pairing Chat Server Library
//!
//! Users log in with a display name, wait in a FIFO pool, get matched with a
//! stranger, and see each other's text live as it is typed.
//!
//! # Features
//! - `POST /login` issuing per-process identities
//! - WebSocket authentication against those identities
//! - FIFO partner matching
//! - Live typing / stop-typing relay to the partner only
//! - Partner-disconnect notification
//! - Optional static file serving for the browser client
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the single task owning all state; it feeds each command
//!   to the `Coordinator` and delivers the resulting messages
//! - `Coordinator` is a plain synchronous state machine over four small
//!   structures: identity registry, connection map, waiting queue, pairing table
//! - Each WebSocket has a `handler` task pair talking to the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use std::net::SocketAddr;
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use pairchat::{build_router, AppState, ChatServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!     tokio::spawn(ChatServer::new(cmd_rx).run());
//!
//!     let app = build_router(AppState { commands: cmd_tx }, None);
//!     let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod client;
pub mod config;
pub mod connections;
pub mod coordinator;
pub mod error;
pub mod handler;
pub mod message;
pub mod pairing;
pub mod queue;
pub mod registry;
pub mod routes;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use client::Client;
pub use config::Config;
pub use connections::ConnectionMap;
pub use coordinator::{Coordinator, Delivery, UserState};
pub use error::{AppError, SendError};
pub use handler::handle_connection;
pub use message::{ClientMessage, LoginRequest, LoginResponse, ServerMessage};
pub use pairing::PairingTable;
pub use queue::WaitingQueue;
pub use registry::{IdentityRegistry, User};
pub use routes::{build_router, AppState};
pub use server::{ChatServer, ServerCommand};
pub use types::{ConnectionId, UserId};
