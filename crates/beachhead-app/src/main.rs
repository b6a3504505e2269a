//! Headless Beachhead runner.
//!
//! Plays a match from a bundled scenario or a JSON config and prints one JSON
//! line per tick that raised events, followed by a summary line.

use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use clap::Parser;
use log::info;

use beachhead_app::game_loop::{spawn_game_loop, Pacing};
use beachhead_app::state::{AppState, GameLoopCommand};
use beachhead_app::AppError;
use beachhead_core::commands::PlayerCommand;
use beachhead_core::config::MatchConfig;
use beachhead_core::enums::MatchPhase;
use beachhead_core::state::MatchSnapshot;
use beachhead_sim::scenario;
use beachhead_sim::SimulationEngine;

#[derive(Parser, Debug)]
#[command(name = "beachhead", about = "Run a Beachhead match without a renderer")]
struct Cli {
    /// Match config JSON file. Overrides --scenario.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bundled scenario to play.
    #[arg(long, default_value = "beach_assault")]
    scenario: String,

    /// Override the config's RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,

    /// Send the next wave whenever the match is waiting for one.
    #[arg(long)]
    auto_send: bool,

    /// Run on the game loop thread at the real tick rate.
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<(), AppError> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MatchConfig::from_path(path)?,
        None => scenario::by_name(&cli.scenario)
            .ok_or_else(|| AppError::UnknownScenario(cli.scenario.clone()))?,
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    info!(
        "starting match: {} waves, {} towers, seed {}",
        config.waves.len(),
        config.towers.len(),
        config.seed
    );

    let last = if cli.realtime {
        run_realtime(config, &cli)?
    } else {
        run_headless(config, &cli)?
    };

    if let Some(snapshot) = last {
        print_summary(&snapshot)?;
    }
    Ok(())
}

/// Tick the engine on this thread as fast as possible.
fn run_headless(config: MatchConfig, cli: &Cli) -> Result<Option<MatchSnapshot>, AppError> {
    let mut engine = SimulationEngine::new(config)?;
    let mut last = None;

    for _ in 0..cli.max_ticks {
        if cli.auto_send && engine.phase() == MatchPhase::PreWave {
            engine.queue_command(PlayerCommand::SendWave);
        }
        let snapshot = engine.tick();
        emit(&snapshot)?;
        let done = is_over(&snapshot);
        last = Some(snapshot);
        if done {
            break;
        }
    }

    engine.teardown();
    Ok(last)
}

/// Drive the match through the game loop thread at the real tick rate.
fn run_realtime(config: MatchConfig, cli: &Cli) -> Result<Option<MatchSnapshot>, AppError> {
    let state = AppState::new();
    let (snap_tx, snap_rx) = mpsc::channel();
    let (cmd_tx, handle) = spawn_game_loop(
        config,
        Arc::clone(&state.latest_snapshot),
        Some(snap_tx),
        Pacing::Realtime,
    )?;
    if let Ok(mut lock) = state.command_tx.lock() {
        *lock = Some(cmd_tx);
    }

    let mut sent_for = None;
    for snapshot in snap_rx.iter().take(cli.max_ticks as usize) {
        emit(&snapshot)?;
        // One send per PreWave stretch; the reply lands a tick later.
        if cli.auto_send
            && snapshot.phase == MatchPhase::PreWave
            && sent_for != Some(snapshot.wave_number)
        {
            sent_for = Some(snapshot.wave_number);
            state.send(GameLoopCommand::PlayerCommand(PlayerCommand::SendWave));
        }
        if is_over(&snapshot) {
            break;
        }
    }

    state.send(GameLoopCommand::Shutdown);
    let _ = handle.join();
    Ok(state.snapshot())
}

fn is_over(snapshot: &MatchSnapshot) -> bool {
    matches!(snapshot.phase, MatchPhase::Won | MatchPhase::Lost)
}

fn emit(snapshot: &MatchSnapshot) -> Result<(), AppError> {
    if snapshot.events.is_empty() && snapshot.navigation.is_empty() {
        return Ok(());
    }
    let line = serde_json::json!({
        "tick": snapshot.time.tick,
        "elapsed_secs": snapshot.time.elapsed_secs,
        "phase": snapshot.phase,
        "events": snapshot.events,
        "navigation": snapshot.navigation,
    });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

fn print_summary(snapshot: &MatchSnapshot) -> Result<(), AppError> {
    let summary = serde_json::json!({
        "summary": {
            "phase": snapshot.phase,
            "tick": snapshot.time.tick,
            "wave_number": snapshot.wave_number,
            "waves_total": snapshot.waves_total,
            "towers_remaining": snapshot.towers_remaining,
            "active_enemies": snapshot.active_enemies,
        }
    });
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
