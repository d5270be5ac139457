//! Game-progress state machine and session lifecycle.
//!
//! Levels advance strictly forward (`Input → Heating → Sorting → Cooling →
//! Results`); the only backward path is [`GameState::reset`]. A simulation
//! level may only be left once it has reached its terminal condition.

use thiserror::Error;

use crate::heating::CELL_COUNT;
use crate::types::{
    Constants, CoolingState, Counters, FeedstockMix, GameState, HeatingState, Level, MetaState,
    ProcessScores, SimPhase, SortingState,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("cannot advance past {0}; reset to start over")]
    AtFinalLevel(Level),
    #[error("level {0} has not reached its terminal condition")]
    LevelNotFinished(Level),
}

impl Level {
    /// The level that follows `self` in play order, if any.
    pub fn next(self) -> Option<Level> {
        match self {
            Level::Input => Some(Level::Heating),
            Level::Heating => Some(Level::Sorting),
            Level::Sorting => Some(Level::Cooling),
            Level::Cooling => Some(Level::Results),
            Level::Results => None,
        }
    }
}

impl GameState {
    /// A fresh session at the input screen.
    pub fn new(constants: &Constants, seed: u64) -> GameState {
        GameState {
            meta: MetaState {
                tick: 0,
                seed,
                schema_version: 1,
            },
            level: Level::Input,
            feedstock: initial_feedstock(constants),
            scores: ProcessScores {
                heating: 0.0,
                sorting: 0.0,
                cooling: 0.0,
            },
            heating: initial_heating(),
            cooling: initial_cooling(constants),
            sorting: initial_sorting(constants),
            counters: Counters {
                next_event_id: 0,
                next_item_id: 0,
            },
        }
    }

    /// Set the plastic percentage (clamped to 100) and derive biomass as the
    /// complement. Total function; never fails.
    pub fn set_feedstock(&mut self, plastic_pct: u8) {
        let plastic = plastic_pct.min(100);
        self.feedstock = FeedstockMix {
            plastic_pct: plastic,
            biomass_pct: 100 - plastic,
        };
    }

    /// Overwrites unconditionally; the engine calls this exactly once, on the
    /// heating simulation's terminal edge.
    pub fn set_heating_score(&mut self, score: f32) {
        self.scores.heating = score;
    }

    pub fn set_sorting_score(&mut self, score: f32) {
        self.scores.sorting = score;
    }

    pub fn set_cooling_score(&mut self, score: f32) {
        self.scores.cooling = score;
    }

    /// Validated forward transition. Fails if the active simulation is still
    /// running, or if the session is already at the results screen.
    pub fn advance(&mut self) -> Result<Level, ProgressError> {
        let finished = match self.level {
            Level::Input | Level::Results => true,
            Level::Heating => self.heating.phase == SimPhase::Done,
            Level::Sorting => self.sorting.phase == SimPhase::Done,
            Level::Cooling => self.cooling.phase == SimPhase::Done,
        };
        if !finished {
            return Err(ProgressError::LevelNotFinished(self.level));
        }
        let next = self
            .level
            .next()
            .ok_or(ProgressError::AtFinalLevel(self.level))?;
        self.level = next;
        Ok(next)
    }

    /// Back to the input screen with initial ratios, zero scores, and fresh
    /// simulation state. The tick counter and id counters are not rewound, so
    /// event and item ids stay monotonic across resets.
    pub fn reset(&mut self, constants: &Constants) {
        self.level = Level::Input;
        self.feedstock = initial_feedstock(constants);
        self.scores = ProcessScores {
            heating: 0.0,
            sorting: 0.0,
            cooling: 0.0,
        };
        self.heating = initial_heating();
        self.cooling = initial_cooling(constants);
        self.sorting = initial_sorting(constants);
    }
}

fn initial_feedstock(constants: &Constants) -> FeedstockMix {
    let plastic = constants.initial_plastic_pct.min(100);
    FeedstockMix {
        plastic_pct: plastic,
        biomass_pct: 100 - plastic,
    }
}

fn initial_heating() -> HeatingState {
    HeatingState {
        cells: vec![0.0; CELL_COUNT],
        beam: None,
        phase: SimPhase::Running,
    }
}

fn initial_cooling(constants: &Constants) -> CoolingState {
    CoolingState {
        temperature: constants.initial_temperature,
        cooling_power: 0,
        liquid_level: 0.0,
        efficiency: 0.0,
        phase: SimPhase::Running,
    }
}

fn initial_sorting(constants: &Constants) -> SortingState {
    SortingState {
        in_flight: Vec::new(),
        sorted_count: 0,
        mistakes: 0,
        ticks_until_spawn: constants.spawn_delay_ticks,
        phase: SimPhase::Running,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_constants;

    #[test]
    fn ratios_always_sum_to_100() {
        let constants = base_constants();
        let mut state = GameState::new(&constants, 42);
        for plastic in 0..=100u8 {
            state.set_feedstock(plastic);
            assert_eq!(state.feedstock.plastic_pct, plastic);
            assert_eq!(
                u32::from(state.feedstock.plastic_pct) + u32::from(state.feedstock.biomass_pct),
                100
            );
        }
    }

    #[test]
    fn set_feedstock_clamps_above_100() {
        let constants = base_constants();
        let mut state = GameState::new(&constants, 42);
        state.set_feedstock(250);
        assert_eq!(state.feedstock.plastic_pct, 100);
        assert_eq!(state.feedstock.biomass_pct, 0);
    }

    #[test]
    fn advance_from_input_needs_no_terminal() {
        let constants = base_constants();
        let mut state = GameState::new(&constants, 42);
        assert_eq!(state.advance(), Ok(Level::Heating));
        assert_eq!(state.level, Level::Heating);
    }

    #[test]
    fn advance_blocked_while_simulation_running() {
        let constants = base_constants();
        let mut state = GameState::new(&constants, 42);
        state.advance().unwrap();
        assert_eq!(
            state.advance(),
            Err(ProgressError::LevelNotFinished(Level::Heating))
        );
        assert_eq!(state.level, Level::Heating, "level must not move on error");
    }

    #[test]
    fn advance_past_results_fails() {
        let constants = base_constants();
        let mut state = GameState::new(&constants, 42);
        state.advance().unwrap();
        state.heating.phase = SimPhase::Done;
        state.advance().unwrap();
        state.sorting.phase = SimPhase::Done;
        state.advance().unwrap();
        state.cooling.phase = SimPhase::Done;
        assert_eq!(state.advance(), Ok(Level::Results));
        assert_eq!(
            state.advance(),
            Err(ProgressError::AtFinalLevel(Level::Results))
        );
    }

    #[test]
    fn reset_restores_initial_fields() {
        let constants = base_constants();
        let mut state = GameState::new(&constants, 7);

        state.set_feedstock(90);
        state.advance().unwrap();
        state.heating.cells[0] = 1.1;
        state.heating.phase = SimPhase::Done;
        state.set_heating_score(0.8);
        state.cooling.temperature = 30.0;
        state.sorting.sorted_count = 9;

        state.reset(&constants);

        let fresh = GameState::new(&constants, 7);
        assert_eq!(state.level, Level::Input);
        assert_eq!(state.feedstock, fresh.feedstock);
        assert_eq!(state.scores, fresh.scores);
        assert_eq!(state.heating.cells, fresh.heating.cells);
        assert_eq!(state.heating.phase, SimPhase::Running);
        assert!((state.cooling.temperature - constants.initial_temperature).abs() < f32::EPSILON);
        assert_eq!(state.sorting.sorted_count, 0);
        assert!(state.sorting.in_flight.is_empty());
    }

    #[test]
    fn reset_keeps_id_counters_monotonic() {
        let constants = base_constants();
        let mut state = GameState::new(&constants, 7);
        state.counters.next_event_id = 12;
        state.counters.next_item_id = 5;
        state.reset(&constants);
        assert_eq!(state.counters.next_event_id, 12);
        assert_eq!(state.counters.next_item_id, 5);
    }
}
