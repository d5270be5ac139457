use rand::Rng;

use crate::types::{
    CellPos, Command, CommandEnvelope, Constants, Event, EventEnvelope, EventLevel, GameState,
    Level,
};
use crate::{cooling, emit, heating, sorting};

/// Advance the game by one tick.
///
/// Order of operations:
/// 1. Apply commands scheduled for this tick.
/// 2. Advance the active level's simulation one step (terminal conditions
///    commit their score here, exactly once).
/// 3. Increment the tick counter.
///
/// Returns all events produced this tick.
pub fn tick(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    constants: &Constants,
    rng: &mut impl Rng,
    event_level: EventLevel,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();

    apply_commands(state, commands, constants, &mut events);
    step_active_level(state, constants, rng, event_level, &mut events);

    state.meta.tick += 1;
    events
}

fn apply_commands(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    constants: &Constants,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.tick;

    for envelope in commands {
        if envelope.execute_at_tick != current_tick {
            continue;
        }
        match &envelope.command {
            Command::SetFeedstock { plastic_pct } => {
                state.set_feedstock(*plastic_pct);
                let mix = state.feedstock;
                events.push(emit(
                    &mut state.counters,
                    current_tick,
                    Event::FeedstockSet {
                        plastic_pct: mix.plastic_pct,
                        biomass_pct: mix.biomass_pct,
                    },
                ));
            }
            Command::AimBeam { cell } => {
                state.heating.beam = Some(clamp_to_grid(*cell));
            }
            Command::ClearBeam => {
                state.heating.beam = None;
            }
            Command::SetCoolingPower { power } => {
                state.cooling.cooling_power = (*power).min(100);
            }
            Command::ClassifyItem { item, bin } => {
                // Unknown ids are stale drags from the presentation layer;
                // drop them without comment.
                let Some(outcome) = sorting::classify(&mut state.sorting, *item, *bin) else {
                    continue;
                };
                let event = match outcome {
                    sorting::ClassifyOutcome::Correct => Event::ItemSorted {
                        item: *item,
                        bin: *bin,
                    },
                    sorting::ClassifyOutcome::Incorrect { actual } => Event::ItemMissed {
                        item: *item,
                        actual,
                    },
                };
                events.push(emit(&mut state.counters, current_tick, event));
            }
            Command::AdvanceLevel => match state.advance() {
                Ok(level) => {
                    events.push(emit(
                        &mut state.counters,
                        current_tick,
                        Event::LevelEntered { level },
                    ));
                }
                Err(err) => {
                    events.push(emit(
                        &mut state.counters,
                        current_tick,
                        Event::CommandRejected {
                            command: envelope.id.clone(),
                            reason: err.to_string(),
                        },
                    ));
                }
            },
            Command::ResetGame => {
                state.reset(constants);
                events.push(emit(&mut state.counters, current_tick, Event::GameReset));
            }
        }
    }
}

fn step_active_level(
    state: &mut GameState,
    constants: &Constants,
    rng: &mut impl Rng,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.tick;
    match state.level {
        Level::Input | Level::Results => {}
        Level::Heating => {
            let Some(report) = heating::step(&mut state.heating, constants) else {
                return;
            };
            if event_level == EventLevel::Debug {
                events.push(emit(
                    &mut state.counters,
                    current_tick,
                    Event::HeatingTick {
                        avg_heat: report.avg_heat,
                        uniformity: report.uniformity,
                    },
                ));
            }
            if let Some(score) = report.committed {
                state.set_heating_score(score);
                push_completion(state, current_tick, Level::Heating, score, events);
            }
        }
        Level::Sorting => {
            let plastic_pct = state.feedstock.plastic_pct;
            let report = sorting::step(
                &mut state.sorting,
                plastic_pct,
                &mut state.counters,
                constants,
                rng,
            );
            if let Some(item) = report.spawned {
                events.push(emit(
                    &mut state.counters,
                    current_tick,
                    Event::ItemSpawned {
                        item: item.id,
                        kind: item.kind,
                    },
                ));
            }
            if let Some(score) = report.committed {
                state.set_sorting_score(score);
                push_completion(state, current_tick, Level::Sorting, score, events);
            }
        }
        Level::Cooling => {
            let Some(report) = cooling::step(&mut state.cooling, constants) else {
                return;
            };
            if event_level == EventLevel::Debug {
                events.push(emit(
                    &mut state.counters,
                    current_tick,
                    Event::CoolingTick {
                        temperature: report.temperature,
                        liquid_level: report.liquid_level,
                        efficiency: report.efficiency,
                    },
                ));
            }
            if let Some(score) = report.committed {
                state.set_cooling_score(score);
                push_completion(state, current_tick, Level::Cooling, score, events);
            }
        }
    }
}

fn push_completion(
    state: &mut GameState,
    tick: u64,
    level: Level,
    score: f32,
    events: &mut Vec<EventEnvelope>,
) {
    events.push(emit(
        &mut state.counters,
        tick,
        Event::ScoreCommitted { level, score },
    ));
    events.push(emit(
        &mut state.counters,
        tick,
        Event::LevelCompleted { level },
    ));
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_to_grid(cell: CellPos) -> CellPos {
    CellPos {
        x: cell.x.min(heating::GRID_WIDTH as u8 - 1),
        y: cell.y.min(heating::GRID_HEIGHT as u8 - 1),
    }
}
