use std::time::Duration;

use clap::Parser;
use rookline::prelude::*;
use tracing_subscriber::EnvFilter;

/// Serves one chess game over WebSocket.
#[derive(Parser, Debug)]
#[command(name = "rookline-server", version, about = "Real-time chess session server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Seconds a disconnected player can reclaim their color with their
    /// reconnection token.
    #[arg(long, default_value_t = 30)]
    reconnect_grace_secs: u64,

    /// Milliseconds a new connection has to send `hello`.
    #[arg(long, default_value_t = 5000)]
    handshake_timeout_ms: u64,

    /// Start from this FEN instead of the standard position.
    #[arg(long)]
    start_fen: Option<String>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            bind_addr: args.bind,
            registry: RegistryConfig {
                reconnect_grace_secs: args.reconnect_grace_secs,
            },
            handshake_timeout: Duration::from_millis(args.handshake_timeout_ms),
            start_fen: args.start_fen,
            ..ServerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), RooklineError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from(Args::parse());
    let server = RooklineServer::builder()
        .config(config)
        .build(StandardRules)
        .await?;

    tracing::info!(addr = %server.local_addr()?, "listening");
    server.run().await
}
