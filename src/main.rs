//! Pairing Chat Server - Entry Point
//!
//! Starts the ChatServer actor and serves the HTTP/WebSocket router.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pairchat::{build_router, AppState, ChatServer, Config};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=pairchat=trace,tower_http=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pairchat=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Create ChatServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    tokio::spawn(ChatServer::new(cmd_rx).run());
    info!("ChatServer actor started");

    let static_dir = config.static_dir_if_present();
    match static_dir {
        Some(dir) => info!("Serving static files from {}", dir.display()),
        None => info!(
            "Static directory {} not found, serving API only",
            config.static_dir.display()
        ),
    }
    let app = build_router(AppState { commands: cmd_tx }, static_dir);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Pairing chat server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
