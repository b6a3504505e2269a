//! Game loop thread: runs the simulation engine at 30Hz and publishes snapshots.
//!
//! The engine is created inside this thread; its scheduler holds
//! single-threaded cancellation handles. Commands and contacts arrive via
//! `mpsc` channel. Snapshots are forwarded to an optional subscriber channel
//! and stored in shared state for synchronous polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{error, info};

use beachhead_core::config::MatchConfig;
use beachhead_core::constants::TICK_RATE;
use beachhead_core::state::MatchSnapshot;
use beachhead_sim::engine::SimulationEngine;

use crate::error::AppError;
use crate::state::GameLoopCommand;

/// Nominal duration of one tick.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// How the loop spaces its ticks in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep so ticks land every [`TICK_DURATION`].
    Realtime,
    /// Tick as fast as possible. Used for headless runs and tests.
    Unthrottled,
}

/// Spawns the game loop in a new thread.
///
/// The config is validated here so a bad config fails the caller instead of
/// the thread. Returns the command sender and the thread handle.
pub fn spawn_game_loop(
    config: MatchConfig,
    latest_snapshot: Arc<Mutex<Option<MatchSnapshot>>>,
    snapshot_tx: Option<mpsc::Sender<MatchSnapshot>>,
    pacing: Pacing,
) -> Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<()>), AppError> {
    config.validate()?;
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("beachhead-game-loop".into())
        .spawn(move || {
            run_game_loop(config, cmd_rx, &latest_snapshot, snapshot_tx, pacing);
        })?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    config: MatchConfig,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<MatchSnapshot>>,
    snapshot_tx: Option<mpsc::Sender<MatchSnapshot>>,
    pacing: Pacing,
) {
    let mut engine = match SimulationEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("game loop could not start: {e}");
            return;
        }
    };
    info!("game loop started ({:?})", pacing);

    let mut snapshot_tx = snapshot_tx;
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Contact(contact)) => engine.queue_contact(contact),
                Ok(GameLoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    engine.teardown();
                    info!("game loop stopped at tick {}", engine.time().tick);
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Advance one tick
        let snapshot = engine.tick();

        // 3. Forward to the subscriber; drop it once it hangs up
        if let Some(tx) = &snapshot_tx {
            if tx.send(snapshot.clone()).is_err() {
                snapshot_tx = None;
            }
        }

        // 4. Store latest snapshot for synchronous polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 5. Sleep until next tick
        if pacing == Pacing::Unthrottled {
            std::thread::yield_now();
            continue;
        }

        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            // Too far behind, reset to avoid a catch-up spiral
            next_tick_time = now;
        }
    }
}
