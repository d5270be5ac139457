//! Output sorting: timed spawner, feedstock-biased item kinds, bin
//! classification, recovery scoring.

use rand::Rng;

use crate::types::{Constants, Counters, ItemId, OutputKind, SimPhase, SortItem, SortingState};

/// Snapshot of one sorting tick. `committed` carries the recovery score on
/// the tick the classification target is met, and is `Some` exactly once.
#[derive(Default)]
pub(crate) struct SortingTickReport {
    pub spawned: Option<SortItem>,
    pub committed: Option<f32>,
}

pub(crate) enum ClassifyOutcome {
    Correct,
    Incorrect { actual: OutputKind },
}

/// Advance the sorting simulation by one tick: check the terminal condition,
/// then run the spawner countdown.
pub(crate) fn step(
    sorting: &mut SortingState,
    plastic_pct: u8,
    counters: &mut Counters,
    constants: &Constants,
    rng: &mut impl Rng,
) -> SortingTickReport {
    let mut report = SortingTickReport::default();
    if sorting.phase == SimPhase::Done {
        return report;
    }

    if sorting.sorted_count + sorting.mistakes >= constants.total_to_sort {
        sorting.phase = SimPhase::Done;
        report.committed = Some(final_score(sorting, constants));
        return report;
    }

    if sorting.in_flight.len() < constants.max_items_in_flight {
        if sorting.ticks_until_spawn == 0 {
            let item = SortItem {
                id: ItemId(counters.next_item_id),
                kind: roll_kind(plastic_pct, constants, rng),
            };
            counters.next_item_id += 1;
            sorting.in_flight.push(item);
            sorting.ticks_until_spawn = constants.spawn_delay_ticks;
            report.spawned = Some(item);
        } else {
            sorting.ticks_until_spawn -= 1;
        }
    } else {
        // Belt full: the delay re-arms from the next eligible tick.
        sorting.ticks_until_spawn = constants.spawn_delay_ticks;
    }

    report
}

/// Resolve a classification. Returns `None` for unknown item ids (stale drag
/// events) and after the level is done. The item is removed either way —
/// there is no retry.
pub(crate) fn classify(
    sorting: &mut SortingState,
    item: ItemId,
    bin: OutputKind,
) -> Option<ClassifyOutcome> {
    if sorting.phase == SimPhase::Done {
        return None;
    }
    let idx = sorting.in_flight.iter().position(|i| i.id == item)?;
    let removed = sorting.in_flight.remove(idx);
    if removed.kind == bin {
        sorting.sorted_count += 1;
        Some(ClassifyOutcome::Correct)
    } else {
        sorting.mistakes += 1;
        Some(ClassifyOutcome::Incorrect {
            actual: removed.kind,
        })
    }
}

/// `max(0, (sorted - mistakes * penalty) / total)` — mistakes count at half
/// weight with the default penalty, and the score never goes negative.
pub(crate) fn final_score(sorting: &SortingState, constants: &Constants) -> f32 {
    let raw = (sorting.sorted_count as f32 - sorting.mistakes as f32 * constants.mistake_penalty)
        / constants.total_to_sort as f32;
    raw.max(0.0)
}

/// Normalized `[fuel, gas, char]` spawn weights for a given plastic
/// percentage.
///
/// Reproduces the original threshold construction: fuel claims
/// `0.7 * plastic + 10` percentage points (capped at 100), gas whatever is
/// left below the gas cutoff, char the remainder. At `plastic = 100` the
/// fuel share reaches the cutoff and gas becomes unreachable — intentional,
/// covered by a regression test.
pub fn spawn_weights(plastic_pct: u8, constants: &Constants) -> [f32; 3] {
    let fuel_pts = (f32::from(plastic_pct) * constants.fuel_bias_per_plastic
        + constants.fuel_bias_floor_pct)
        .min(100.0);
    let gas_pts = (constants.gas_cutoff_pct - fuel_pts).max(0.0);
    let char_pts = (100.0 - fuel_pts - gas_pts).max(0.0);
    let total = fuel_pts + gas_pts + char_pts;
    [fuel_pts / total, gas_pts / total, char_pts / total]
}

fn roll_kind(plastic_pct: u8, constants: &Constants, rng: &mut impl Rng) -> OutputKind {
    let [fuel, gas, _] = spawn_weights(plastic_pct, constants);
    let roll: f32 = rng.gen();
    if roll < fuel {
        OutputKind::Fuel
    } else if roll < fuel + gas {
        OutputKind::Gas
    } else {
        OutputKind::Char
    }
}

impl SortingState {
    /// Items still to be classified before the level ends.
    pub fn remaining(&self, constants: &Constants) -> u32 {
        constants
            .total_to_sort
            .saturating_sub(self.sorted_count + self.mistakes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_constants, make_rng};

    fn fresh_state(constants: &Constants) -> SortingState {
        SortingState {
            in_flight: Vec::new(),
            sorted_count: 0,
            mistakes: 0,
            ticks_until_spawn: constants.spawn_delay_ticks,
            phase: SimPhase::Running,
        }
    }

    #[test]
    fn weights_at_zero_plastic() {
        let constants = base_constants();
        let [fuel, gas, char_] = spawn_weights(0, &constants);
        assert!((fuel - 0.1).abs() < 1e-6);
        assert!((gas - 0.7).abs() < 1e-6);
        assert!((char_ - 0.2).abs() < 1e-6);
    }

    #[test]
    fn weights_at_full_plastic_make_gas_unreachable() {
        let constants = base_constants();
        let [fuel, gas, char_] = spawn_weights(100, &constants);
        assert!((fuel - 0.8).abs() < 1e-6);
        assert!(gas.abs() < f32::EPSILON, "gas must saturate to zero");
        assert!((char_ - 0.2).abs() < 1e-6);
    }

    #[test]
    fn weights_sum_to_one_for_all_ratios() {
        let constants = base_constants();
        for plastic in 0..=100u8 {
            let weights = spawn_weights(plastic, &constants);
            let sum: f32 = weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "plastic={plastic} sum={sum}");
        }
    }

    #[test]
    fn sampled_kinds_follow_weights_at_zero_plastic() {
        let constants = base_constants();
        let mut rng = make_rng();
        let mut counts = [0u32; 3];
        let samples = 10_000;
        for _ in 0..samples {
            match roll_kind(0, &constants, &mut rng) {
                OutputKind::Fuel => counts[0] += 1,
                OutputKind::Gas => counts[1] += 1,
                OutputKind::Char => counts[2] += 1,
            }
        }
        let fuel_frac = counts[0] as f32 / samples as f32;
        let gas_frac = counts[1] as f32 / samples as f32;
        let char_frac = counts[2] as f32 / samples as f32;
        assert!((fuel_frac - 0.1).abs() < 0.03, "fuel {fuel_frac}");
        assert!((gas_frac - 0.7).abs() < 0.03, "gas {gas_frac}");
        assert!((char_frac - 0.2).abs() < 0.03, "char {char_frac}");
    }

    #[test]
    fn full_plastic_never_rolls_gas() {
        let constants = base_constants();
        let mut rng = make_rng();
        for _ in 0..5_000 {
            assert_ne!(roll_kind(100, &constants, &mut rng), OutputKind::Gas);
        }
    }

    #[test]
    fn spawner_waits_for_delay_then_spawns() {
        let mut constants = base_constants();
        constants.spawn_delay_ticks = 3;
        let mut sorting = fresh_state(&constants);
        let mut counters = Counters {
            next_event_id: 0,
            next_item_id: 0,
        };
        let mut rng = make_rng();

        for _ in 0..3 {
            let report = step(&mut sorting, 50, &mut counters, &constants, &mut rng);
            assert!(report.spawned.is_none());
        }
        let report = step(&mut sorting, 50, &mut counters, &constants, &mut rng);
        assert!(report.spawned.is_some());
        assert_eq!(sorting.in_flight.len(), 1);
    }

    #[test]
    fn spawner_caps_items_in_flight() {
        let mut constants = base_constants();
        constants.spawn_delay_ticks = 0;
        let mut sorting = fresh_state(&constants);
        sorting.ticks_until_spawn = 0;
        let mut counters = Counters {
            next_event_id: 0,
            next_item_id: 0,
        };
        let mut rng = make_rng();

        for _ in 0..50 {
            step(&mut sorting, 50, &mut counters, &constants, &mut rng);
        }
        assert_eq!(sorting.in_flight.len(), constants.max_items_in_flight);
    }

    #[test]
    fn item_ids_are_monotonic() {
        let mut constants = base_constants();
        constants.spawn_delay_ticks = 0;
        let mut sorting = fresh_state(&constants);
        sorting.ticks_until_spawn = 0;
        let mut counters = Counters {
            next_event_id: 0,
            next_item_id: 0,
        };
        let mut rng = make_rng();

        let mut ids = Vec::new();
        for _ in 0..20 {
            if let Some(item) = step(&mut sorting, 50, &mut counters, &constants, &mut rng).spawned
            {
                ids.push(item.id.0);
            }
            // Drain the belt so the spawner keeps going.
            while let Some(item) = sorting.in_flight.first().copied() {
                classify(&mut sorting, item.id, item.kind);
            }
        }
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0], "ids must strictly increase");
        }
    }

    #[test]
    fn classify_removes_item_on_either_outcome() {
        let constants = base_constants();
        let mut sorting = fresh_state(&constants);
        sorting.in_flight.push(SortItem {
            id: ItemId(0),
            kind: OutputKind::Fuel,
        });
        sorting.in_flight.push(SortItem {
            id: ItemId(1),
            kind: OutputKind::Gas,
        });

        assert!(matches!(
            classify(&mut sorting, ItemId(0), OutputKind::Fuel),
            Some(ClassifyOutcome::Correct)
        ));
        assert!(matches!(
            classify(&mut sorting, ItemId(1), OutputKind::Fuel),
            Some(ClassifyOutcome::Incorrect {
                actual: OutputKind::Gas
            })
        ));
        assert!(sorting.in_flight.is_empty());
        assert_eq!(sorting.sorted_count, 1);
        assert_eq!(sorting.mistakes, 1);
    }

    #[test]
    fn classify_unknown_item_is_ignored() {
        let constants = base_constants();
        let mut sorting = fresh_state(&constants);
        assert!(classify(&mut sorting, ItemId(99), OutputKind::Fuel).is_none());
        assert_eq!(sorting.sorted_count, 0);
        assert_eq!(sorting.mistakes, 0);
    }

    #[test]
    fn score_formula_literals() {
        let constants = base_constants();
        let mut sorting = fresh_state(&constants);

        sorting.sorted_count = 15;
        sorting.mistakes = 0;
        assert!((final_score(&sorting, &constants) - 1.0).abs() < f32::EPSILON);

        sorting.sorted_count = 0;
        sorting.mistakes = 15;
        assert!(
            final_score(&sorting, &constants).abs() < f32::EPSILON,
            "raw -0.5 clamps to 0"
        );

        sorting.sorted_count = 10;
        sorting.mistakes = 5;
        assert!((final_score(&sorting, &constants) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn terminal_commits_once_at_target() {
        let constants = base_constants();
        let mut sorting = fresh_state(&constants);
        let mut counters = Counters {
            next_event_id: 0,
            next_item_id: 0,
        };
        let mut rng = make_rng();

        sorting.sorted_count = 12;
        sorting.mistakes = 3;
        let report = step(&mut sorting, 50, &mut counters, &constants, &mut rng);
        let score = report.committed.expect("15 events must terminate");
        assert!((score - (12.0 - 1.5) / 15.0).abs() < 1e-6);
        assert_eq!(sorting.phase, SimPhase::Done);

        let report = step(&mut sorting, 50, &mut counters, &constants, &mut rng);
        assert!(report.committed.is_none(), "commit must fire exactly once");
    }

    #[test]
    fn remaining_counts_down() {
        let constants = base_constants();
        let mut sorting = fresh_state(&constants);
        assert_eq!(sorting.remaining(&constants), 15);
        sorting.sorted_count = 9;
        sorting.mistakes = 2;
        assert_eq!(sorting.remaining(&constants), 4);
    }
}
