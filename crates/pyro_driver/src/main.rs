//! Realtime host: plays the pyrolysis game wall-clock, one scheduled level
//! ticker at a time, logging engine events as they stream out.

mod state;
mod ticker;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use pyro_control::ScriptedOperator;
use pyro_core::{compute_results, Event, EventEnvelope, GameState, Level};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use state::SessionState;

#[derive(Parser)]
#[command(name = "pyro_driver", about = "Realtime pyrolysis process game host")]
struct Cli {
    /// Session seed; random if omitted.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Stop after this many engine ticks even if the run is unfinished.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Plastic percentage the operator dials in.
    #[arg(long, default_value_t = 65)]
    plastic: u8,
    /// Cooling power the operator holds.
    #[arg(long, default_value_t = 70)]
    cooling_power: u8,
}

async fn log_events(mut rx: broadcast::Receiver<Vec<EventEnvelope>>) {
    loop {
        match rx.recv().await {
            Ok(events) => {
                for envelope in &events {
                    match &envelope.event {
                        Event::LevelEntered { level } => {
                            tracing::info!(%level, tick = envelope.tick, "level entered");
                        }
                        Event::ScoreCommitted { level, score } => {
                            tracing::info!(
                                %level,
                                score = f64::from(*score),
                                tick = envelope.tick,
                                "score committed"
                            );
                        }
                        Event::CommandRejected { reason, .. } => {
                            tracing::warn!(%reason, tick = envelope.tick, "command rejected");
                        }
                        _ => {}
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let constants =
        pyro_content::load_constants(&cli.content_dir).context("loading tuning constants")?;
    let seed = cli.seed.unwrap_or_else(rand::random);

    let session = Arc::new(Mutex::new(SessionState {
        game: GameState::new(&constants, seed),
        constants,
        rng: ChaCha8Rng::seed_from_u64(seed),
        operator: ScriptedOperator::new(cli.plastic, cli.cooling_power),
        next_command_id: 0,
    }));

    let (event_tx, event_rx) = broadcast::channel(256);
    let logger = tokio::spawn(log_events(event_rx));

    tracing::info!(seed, "session start");
    let reached = ticker::run_session(session.clone(), event_tx.clone(), cli.max_ticks).await;

    // Close the channel so the logger drains and exits.
    drop(event_tx);
    let _ = logger.await;

    let guard = session.lock();
    if reached == Level::Results {
        let summary = compute_results(&guard.game, &guard.constants);
        println!("Process complete after {} ticks (seed {seed}).", guard.game.meta.tick);
        println!(
            "Final efficiency {}% | fuel {}% gas {}% char {}% losses {}%",
            summary.final_score,
            summary.fuel_yield,
            summary.gas_yield,
            summary.char_yield,
            summary.losses,
        );
    } else {
        println!(
            "Stopped at the {} level after {} ticks (budget reached).",
            reached, guard.game.meta.tick
        );
    }
    Ok(())
}
