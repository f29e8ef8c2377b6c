//! Terminal front end for the wish wall.
//!
//! Runs one of the three screens against a `wishwall-node`:
//!
//! - `wishwall guest` reads wishes from stdin, one per line
//! - `wishwall wall` redraws the approved messages on every change
//! - `wishwall admin` lists the queue and takes moderation commands

use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use wishwall_common::guest::GuestPhase;
use wishwall_common::identity::Credentials;
use wishwall_common::message::{MessageId, MessageStatus};
use wishwall_common::view::DisplayTier;
use wishwall_store::ClientConfig;
use wishwall_ui::components::{admin_view, guest_view, wall_view};
use wishwall_ui::{AdminScreen, App, FeedStatus, GuestScreen, ModerationQueue, WallBoard, WallScreen};

#[derive(Parser)]
#[command(name = "wishwall", about = "Wish wall screens for the terminal")]
struct Cli {
    /// Node base URL (falls back to WISHWALL_NODE_URL).
    #[arg(long, env = "WISHWALL_NODE_URL")]
    node_url: Option<String>,

    /// Room to join (falls back to WISHWALL_ROOM).
    #[arg(long, env = "WISHWALL_ROOM")]
    room: Option<String>,

    /// Moderator token (falls back to WISHWALL_ADMIN_TOKEN).
    #[arg(long, env = "WISHWALL_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    #[command(subcommand)]
    screen: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send wishes, one per line.
    Guest,
    /// Show approved wishes, newest first.
    Wall {
        /// Address the wall is shown at, used for the guest link.
        #[arg(long, default_value = "http://localhost:8080/")]
        page_url: String,
    },
    /// Approve, reject or clear messages.
    Admin,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.node_url {
        config = ClientConfig {
            node_url: ClientConfig::new(url).node_url,
            ..config
        };
    }
    if let Some(room) = cli.room {
        config = config.with_room(room);
    }
    if cli.admin_token.is_some() {
        config = config.with_credentials(Credentials::from_token(cli.admin_token));
    }

    let app = App::connect(config, "")
        .await
        .context("could not sign in to the node")?;

    match cli.screen {
        Command::Guest => run_guest(app.guest()).await,
        Command::Wall { page_url } => run_wall(app.wall(&page_url)).await,
        Command::Admin => run_admin(app.admin()).await,
    }
}

// ─── Guest ───────────────────────────────────────────────────────────────────

async fn run_guest(mut screen: GuestScreen) -> Result<()> {
    println!("{}", guest_view::TITLE);
    println!("{}", guest_view::PLACEHOLDER);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        screen.set_draft(line);
        match screen.submit().await {
            Ok(Some(_)) => {
                println!("{}", guest_view::CONFIRMATION);
                while let GuestPhase::Success { until } = screen.tick(Instant::now()) {
                    tokio::time::sleep_until(until.into()).await;
                }
            }
            // Guests never see send errors; the screen has logged it.
            Ok(None) | Err(_) => {}
        }
    }
    Ok(())
}

// ─── Wall ────────────────────────────────────────────────────────────────────

async fn run_wall(screen: WallScreen) -> Result<()> {
    let mut changes = screen.changes();
    loop {
        let board = changes.borrow_and_update().clone();
        draw_wall(&board, screen.guest_link());
        tokio::select! {
            changed = changes.changed() => changed.context("wall feed ended")?,
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    screen.close();
    Ok(())
}

fn draw_wall(board: &WallBoard, guest_link: &str) {
    println!();
    println!("── {} ── join: {guest_link}", wall_view::SCAN_PROMPT);
    if let FeedStatus::Degraded { .. } = board.feed {
        println!("[{}]", board.feed.label());
    }
    if board.items.is_empty() {
        println!("{}", wall_view::EMPTY_WALL);
    }
    for entry in &board.items {
        let text = match entry.tier {
            DisplayTier::Large => entry.message.text.to_uppercase(),
            DisplayTier::Medium | DisplayTier::Small => entry.message.text.clone(),
        };
        println!("  {text}");
    }
}

// ─── Admin ───────────────────────────────────────────────────────────────────

async fn run_admin(mut screen: AdminScreen) -> Result<()> {
    println!("Commands: a <id> | r <id> | p <id> | clear | resync | quit");
    let mut changes = screen.changes();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut awaiting_clear = None;

    loop {
        tokio::select! {
            changed = changes.changed() => {
                changed.context("moderation feed ended")?;
                draw_queue(&changes.borrow_and_update().clone());
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();

                if let Some(confirmation) = awaiting_clear.take() {
                    if line.eq_ignore_ascii_case("y") {
                        match screen.confirm_clear(confirmation).await {
                            Ok(report) if report.is_complete() => {
                                println!("Deleted {} messages", report.deleted.len());
                            }
                            Ok(report) => println!(
                                "Deleted {}, failed {}: {:?}",
                                report.deleted.len(),
                                report.failed.len(),
                                report.failed_ids()
                            ),
                            Err(e) => eprintln!("Clear failed: {e}"),
                        }
                    } else {
                        println!("Cancelled");
                    }
                    continue;
                }

                match line.split_once(' ') {
                    Some(("a", id)) => moderate(&screen, id, MessageStatus::Approved).await,
                    Some(("r", id)) => moderate(&screen, id, MessageStatus::Rejected).await,
                    Some(("p", id)) => moderate(&screen, id, MessageStatus::Pending).await,
                    _ => match line {
                        "clear" => {
                            let confirmation = screen.request_clear();
                            println!("{} [y/N]", confirmation.prompt());
                            awaiting_clear = Some(confirmation);
                        }
                        "resync" => screen.resync(),
                        "quit" => break,
                        "" => {}
                        other => eprintln!("Unknown command: {other}"),
                    },
                }
            }
        }
    }
    screen.close();
    Ok(())
}

async fn moderate(screen: &AdminScreen, id: &str, status: MessageStatus) {
    let id = MessageId::from(id.trim());
    if let Err(e) = screen.set_status(&id, status).await {
        eprintln!("Could not set {id} to {status}: {e}");
    }
}

fn draw_queue(queue: &ModerationQueue) {
    println!();
    println!("── Pending ({}) ── {}", queue.items.len(), queue.feed.label());
    if queue.items.is_empty() {
        println!("{}", admin_view::EMPTY_QUEUE);
    }
    for message in &queue.items {
        println!(
            "  {}  {}  {}",
            message.id,
            message.created_at.format("%H:%M:%S"),
            message.text
        );
    }
}
