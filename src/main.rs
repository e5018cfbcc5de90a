//! Tower Siege - Entry Point
//!
//! Headless demo driver: creates one session, claims the human slot(s),
//! feeds a scripted effort signal, and prints the broadcast stream. The
//! library is the product; this binary exists to watch a game run.

use clap::{Parser, ValueEnum};
use tokio::sync::broadcast::error::RecvError;

use tower_siege::broadcast::OutboundMessage;
use tower_siege::core::config::SiegeConfig;
use tower_siege::core::error::Result;
use tower_siege::core::types::Team;
use tower_siege::session::registry::{SessionHandle, SessionRegistry};
use tower_siege::session::{GameMode, Phase};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Single human slot against the adaptive bot
    Bot,
    /// Two scripted human slots
    Duel,
}

#[derive(Debug, Parser)]
#[command(name = "tower-siege", about = "Effort-driven territory capture, headless demo")]
struct Args {
    /// Opponent mode
    #[arg(long, value_enum, default_value_t = Mode::Bot)]
    mode: Mode,
    /// Bot RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Game length in seconds
    #[arg(long, default_value_t = 60.0)]
    duration: f64,
    /// Seconds between scripted effort reps for slot A
    #[arg(long, default_value_t = 1.2)]
    effort_interval: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tower_siege=info".to_string()),
        )
        .init();

    let args = Args::parse();
    let mut cfg = SiegeConfig::default();
    cfg.game_duration_secs = args.duration;

    let registry = SessionRegistry::new(cfg);
    let mode = match args.mode {
        Mode::Bot => GameMode::VersusBot,
        Mode::Duel => GameMode::TwoPlayer,
    };
    let handle = registry.create_session(mode, args.seed).await?;
    let mut rx = handle.subscribe();

    let team_a = handle.claim_next_slot().await?;
    let mut feeders = vec![tokio::spawn(feed_effort(
        handle.clone(),
        team_a,
        args.effort_interval,
    ))];
    if mode == GameMode::TwoPlayer {
        let team_b = handle.claim_next_slot().await?;
        // Slot B works a little slower so the duel has a likely winner.
        feeders.push(tokio::spawn(feed_effort(
            handle.clone(),
            team_b,
            args.effort_interval * 1.5,
        )));
        handle.mark_ready(team_b).await;
    }
    handle.mark_ready(team_a).await;

    let mut snapshots: u64 = 0;
    loop {
        match rx.recv().await {
            Ok(OutboundMessage::GameStarted {
                mode,
                duration_secs,
            }) => {
                tracing::info!(?mode, duration_secs, "game started");
            }
            Ok(OutboundMessage::Snapshot(snap)) => {
                snapshots += 1;
                // The stream runs at tick rate; log roughly once a second.
                if snapshots % 30 == 0 {
                    tracing::info!(
                        remaining = format!("{:.0}s", snap.time_remaining_secs),
                        a_towers = snap.teams[0].towers_owned,
                        b_towers = snap.teams[1].towers_owned,
                        a_soldiers = snap.teams[0].total_soldiers,
                        b_soldiers = snap.teams[1].total_soldiers,
                        marches = snap.marches.len(),
                        "tick"
                    );
                    for event in &snap.events {
                        tracing::info!(%event, "board");
                    }
                }
            }
            Ok(OutboundMessage::GameOver { winner }) => {
                println!("winner: {}", winner.token());
                break;
            }
            Ok(OutboundMessage::SessionTerminated) => break,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "broadcast receiver lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }

    for feeder in feeders {
        feeder.abort();
    }
    registry.remove(handle.id).await?;
    Ok(())
}

/// Scripted effort source: one rep per interval while the game runs.
async fn feed_effort(handle: std::sync::Arc<SessionHandle>, team: Team, interval_secs: f64) {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs_f64(interval_secs));
    let mut cumulative: u32 = 0;
    loop {
        ticker.tick().await;
        match handle.phase().await {
            Phase::GameOver => break,
            Phase::Playing => {
                cumulative += 1;
                handle.apply_effort(team, cumulative).await;
            }
            _ => {}
        }
    }
}
