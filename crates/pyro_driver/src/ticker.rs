//! Scheduled level updates with guaranteed cancellation.
//!
//! Each level runs as one owned ticker; dropping the ticker aborts its task,
//! so a torn-down level can never keep mutating state nobody observes.

use std::time::Duration;

use pyro_control::CommandSource;
use pyro_core::{Constants, EventLevel, Level};

use crate::state::{EventTx, SessionState, SharedSession};

/// Tick period for a level. The input and results screens tick at the frame
/// rate so queued commands still apply promptly.
pub fn level_period(level: Level, constants: &Constants) -> Duration {
    let ms = match level {
        Level::Input | Level::Heating | Level::Results => constants.heating_frame_ms,
        Level::Cooling => constants.cooling_tick_ms,
        Level::Sorting => constants.sorting_tick_ms,
    };
    Duration::from_millis(ms.max(1))
}

/// Run engine ticks for `level` until the session leaves it (or the tick
/// budget runs out). One callback body at a time; the lock is released
/// between ticks.
pub async fn run_level_ticks(
    sim: SharedSession,
    event_tx: EventTx,
    level: Level,
    max_ticks: Option<u64>,
) {
    let period = level_period(level, &sim.lock().constants);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);

    loop {
        interval.tick().await;
        let (events, done) = {
            let mut guard = sim.lock();
            if guard.game.level != level {
                break;
            }
            let SessionState {
                ref game,
                ref constants,
                ref mut operator,
                ref mut next_command_id,
                ..
            } = *guard;
            let commands = operator.generate_commands(game, constants, next_command_id);
            let SessionState {
                ref mut game,
                ref constants,
                ref mut rng,
                ..
            } = *guard;
            let events = pyro_core::tick(game, &commands, constants, rng, EventLevel::Normal);

            let level_changed = guard.game.level != level;
            let budget_spent = max_ticks.is_some_and(|max| guard.game.meta.tick >= max);
            (events, level_changed || budget_spent)
        };

        if !events.is_empty() {
            let _ = event_tx.send(events);
        }

        if done {
            break;
        }
    }
    tracing::debug!(%level, "level ticker stopped");
}

/// Owns a spawned level loop. The timer is acquired on spawn and released on
/// every exit path: natural completion, explicit [`LevelTicker::shutdown`],
/// or drop.
pub struct LevelTicker {
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl LevelTicker {
    pub fn spawn(
        sim: SharedSession,
        event_tx: EventTx,
        level: Level,
        max_ticks: Option<u64>,
    ) -> LevelTicker {
        let handle = tokio::spawn(run_level_ticks(sim, event_tx, level, max_ticks));
        LevelTicker {
            handle: Some(handle),
        }
    }

    /// True once the loop has exited on its own.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(tokio::task::JoinHandle::is_finished)
    }

    /// Abort and wait for the task to wind down.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for LevelTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Drive a whole session to the results screen, one level ticker at a time.
/// Returns the level reached (`Results` unless the tick budget ran out).
pub async fn run_session(sim: SharedSession, event_tx: EventTx, max_ticks: Option<u64>) -> Level {
    loop {
        let (level, tick) = {
            let guard = sim.lock();
            (guard.game.level, guard.game.meta.tick)
        };
        if level == Level::Results {
            return level;
        }
        if max_ticks.is_some_and(|max| tick >= max) {
            return level;
        }
        tracing::info!(%level, tick, "running level");
        run_level_ticks(sim.clone(), event_tx.clone(), level, max_ticks).await;
    }
}
