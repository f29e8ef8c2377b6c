//! `wishwall-node` binary: host a wish wall room.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wishwall_common::DEFAULT_ROOM;
use wishwall_node::{serve, AppState, NodeConfig};

#[derive(Parser)]
#[command(name = "wishwall-node", about = "Wish wall room host")]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "WISHWALL_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// HTTP port to listen on.
    #[arg(long, env = "WISHWALL_PORT", default_value_t = 3030)]
    port: u16,

    /// Room to host.
    #[arg(long, env = "WISHWALL_ROOM", default_value = DEFAULT_ROOM)]
    room: String,

    /// Token that signs in as moderator.
    #[arg(long, env = "WISHWALL_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// Refuse sign-in without a token.
    #[arg(long)]
    no_anonymous: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if cli.admin_token.is_none() {
        tracing::warn!("No admin token configured; nobody can moderate");
    }

    let state = Arc::new(AppState::new(NodeConfig {
        room: cli.room.clone(),
        admin_token: cli.admin_token,
        allow_anonymous: !cli.no_anonymous,
    }));

    let addr = format!("{}:{}", cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, room = %cli.room, "Node listening");

    serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down");
    })
    .await
    .context("server error")
}
