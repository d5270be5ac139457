//! End-to-end playthrough driven purely through the public command surface:
//! input → heating → sorting → cooling → results, with scores committed and
//! the final summary consistent.

use pyro_core::test_fixtures::{base_constants, make_rng};
use pyro_core::{
    compute_results, tick, CellPos, Command, CommandEnvelope, CommandId, EventLevel, GameState,
    Level, SimPhase,
};

fn make_cmd(next_id: &mut u64, tick: u64, command: Command) -> CommandEnvelope {
    let id = CommandId(format!("cmd_{:06}", *next_id));
    *next_id += 1;
    CommandEnvelope {
        id,
        issued_tick: tick,
        execute_at_tick: tick,
        command,
    }
}

/// One batch of player commands for the current tick, playing well.
#[allow(clippy::cast_possible_truncation)]
fn play_tick(state: &GameState, next_id: &mut u64) -> Vec<CommandEnvelope> {
    let now = state.meta.tick;
    let mut commands = Vec::new();
    match state.level {
        Level::Input => {
            commands.push(make_cmd(
                next_id,
                now,
                Command::SetFeedstock { plastic_pct: 65 },
            ));
            commands.push(make_cmd(next_id, now, Command::AdvanceLevel));
        }
        Level::Heating => {
            if state.heating.phase == SimPhase::Done {
                commands.push(make_cmd(next_id, now, Command::AdvanceLevel));
            } else {
                let cell = CellPos {
                    x: (now % 10) as u8,
                    y: ((now / 10) % 10) as u8,
                };
                commands.push(make_cmd(next_id, now, Command::AimBeam { cell }));
            }
        }
        Level::Sorting => {
            if state.sorting.phase == SimPhase::Done {
                commands.push(make_cmd(next_id, now, Command::AdvanceLevel));
            } else if let Some(item) = state.sorting.in_flight.first() {
                commands.push(make_cmd(
                    next_id,
                    now,
                    Command::ClassifyItem {
                        item: item.id,
                        bin: item.kind,
                    },
                ));
            }
        }
        Level::Cooling => {
            if state.cooling.phase == SimPhase::Done {
                commands.push(make_cmd(next_id, now, Command::AdvanceLevel));
            } else if state.cooling.cooling_power != 70 {
                commands.push(make_cmd(next_id, now, Command::SetCoolingPower { power: 70 }));
            }
        }
        Level::Results => {}
    }
    commands
}

#[test]
fn full_playthrough_reaches_results_with_consistent_summary() {
    let mut constants = base_constants();
    constants.spawn_delay_ticks = 5;
    let mut state = GameState::new(&constants, 42);
    let mut rng = make_rng();
    let mut next_id = 0u64;

    let mut ticks_used = 0u64;
    for _ in 0..100_000u64 {
        if state.level == Level::Results {
            break;
        }
        let commands = play_tick(&state, &mut next_id);
        tick(&mut state, &commands, &constants, &mut rng, EventLevel::Normal);
        ticks_used += 1;
    }

    assert_eq!(state.level, Level::Results, "stuck after {ticks_used} ticks");
    assert!(state.scores.heating > 0.0 && state.scores.heating <= 1.0);
    assert!((state.scores.sorting - 1.0).abs() < f32::EPSILON);
    assert!(state.scores.cooling > 0.0 && state.scores.cooling <= 1.0);

    let summary = compute_results(&state, &constants);
    assert!(summary.final_score > 0 && summary.final_score <= 100);
    let accounted = i64::from(summary.fuel_yield)
        + i64::from(summary.gas_yield)
        + i64::from(summary.char_yield)
        + i64::from(summary.losses);
    assert_eq!(accounted, 100, "yields and losses must account for 100%");
}

#[test]
fn reset_from_results_allows_a_second_playthrough() {
    let mut constants = base_constants();
    constants.spawn_delay_ticks = 5;
    let mut state = GameState::new(&constants, 42);
    let mut rng = make_rng();
    let mut next_id = 0u64;

    for _ in 0..100_000u64 {
        if state.level == Level::Results {
            break;
        }
        let commands = play_tick(&state, &mut next_id);
        tick(&mut state, &commands, &constants, &mut rng, EventLevel::Normal);
    }
    assert_eq!(state.level, Level::Results);

    let now = state.meta.tick;
    let reset = make_cmd(&mut next_id, now, Command::ResetGame);
    tick(&mut state, &[reset], &constants, &mut rng, EventLevel::Normal);

    assert_eq!(state.level, Level::Input);
    assert!(state.scores.heating.abs() < f32::EPSILON);
    assert!(state.scores.sorting.abs() < f32::EPSILON);
    assert!(state.scores.cooling.abs() < f32::EPSILON);

    // A fresh heating run works after the reset.
    for _ in 0..100_000u64 {
        if state.level == Level::Sorting {
            break;
        }
        let commands = play_tick(&state, &mut next_id);
        tick(&mut state, &commands, &constants, &mut rng, EventLevel::Normal);
    }
    assert_eq!(state.level, Level::Sorting);
}
