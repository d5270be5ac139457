use serde::{Deserialize, Serialize};

use pyro_core::{
    CellPos, Command, CommandEnvelope, CommandId, Constants, GameState, Level, SimPhase,
    CELL_COUNT, GRID_WIDTH,
};

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        constants: &Constants,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope>;
}

/// Plays a full session without a human:
/// 1. Set the configured feedstock mix and start the process.
/// 2. Sweep the beam cell by cell so the chamber heats evenly.
/// 3. Classify belt items as they appear (optionally flubbing every nth one).
/// 4. Hold the cooling slider at the configured power.
/// 5. Advance whenever the active level reports done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedOperator {
    pub plastic_pct: u8,
    pub cooling_power: u8,
    /// `Some(n)`: deliberately mis-bin every nth classification, to exercise
    /// the mistake penalty. `None`: play perfectly.
    pub mistake_every: Option<u32>,
    classified: u32,
}

impl ScriptedOperator {
    pub fn new(plastic_pct: u8, cooling_power: u8) -> ScriptedOperator {
        ScriptedOperator {
            plastic_pct,
            cooling_power,
            mistake_every: None,
            classified: 0,
        }
    }

    pub fn with_mistake_every(mut self, n: u32) -> ScriptedOperator {
        self.mistake_every = Some(n);
        self
    }
}

impl Default for ScriptedOperator {
    fn default() -> ScriptedOperator {
        // 65% plastic favors liquid fuel; power 70 targets the middle of the
        // condensation sweet spot.
        ScriptedOperator::new(65, 70)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Allocates a command ID and builds a `CommandEnvelope`.
fn make_cmd(tick: u64, next_id: &mut u64, command: Command) -> CommandEnvelope {
    let cmd_id = CommandId(format!("cmd_{:06}", *next_id));
    *next_id += 1;
    CommandEnvelope {
        id: cmd_id,
        issued_tick: tick,
        execute_at_tick: tick,
        command,
    }
}

/// Beam target for this tick: walk the grid row by row, one cell per tick.
#[allow(clippy::cast_possible_truncation)]
fn sweep_cell(tick: u64) -> CellPos {
    let idx = (tick % CELL_COUNT as u64) as usize;
    CellPos {
        x: (idx % GRID_WIDTH) as u8,
        y: (idx / GRID_WIDTH) as u8,
    }
}

fn misclassify(kind: pyro_core::OutputKind) -> pyro_core::OutputKind {
    use pyro_core::OutputKind;
    match kind {
        OutputKind::Fuel => OutputKind::Gas,
        OutputKind::Gas => OutputKind::Char,
        OutputKind::Char => OutputKind::Fuel,
    }
}

// ---------------------------------------------------------------------------
// ScriptedOperator
// ---------------------------------------------------------------------------

impl CommandSource for ScriptedOperator {
    fn generate_commands(
        &mut self,
        state: &GameState,
        _constants: &Constants,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        let now = state.meta.tick;
        let mut commands = Vec::new();

        match state.level {
            Level::Input => {
                if state.feedstock.plastic_pct == self.plastic_pct.min(100) {
                    commands.push(make_cmd(now, next_command_id, Command::AdvanceLevel));
                } else {
                    commands.push(make_cmd(
                        now,
                        next_command_id,
                        Command::SetFeedstock {
                            plastic_pct: self.plastic_pct,
                        },
                    ));
                }
            }
            Level::Heating => {
                if state.heating.phase == SimPhase::Done {
                    commands.push(make_cmd(now, next_command_id, Command::AdvanceLevel));
                } else {
                    commands.push(make_cmd(
                        now,
                        next_command_id,
                        Command::AimBeam {
                            cell: sweep_cell(now),
                        },
                    ));
                }
            }
            Level::Sorting => {
                if state.sorting.phase == SimPhase::Done {
                    commands.push(make_cmd(now, next_command_id, Command::AdvanceLevel));
                } else if let Some(item) = state.sorting.in_flight.first() {
                    self.classified += 1;
                    let flub = self
                        .mistake_every
                        .is_some_and(|n| n > 0 && self.classified % n == 0);
                    let bin = if flub {
                        misclassify(item.kind)
                    } else {
                        item.kind
                    };
                    commands.push(make_cmd(
                        now,
                        next_command_id,
                        Command::ClassifyItem { item: item.id, bin },
                    ));
                }
            }
            Level::Cooling => {
                if state.cooling.phase == SimPhase::Done {
                    commands.push(make_cmd(now, next_command_id, Command::AdvanceLevel));
                } else if state.cooling.cooling_power != self.cooling_power.min(100) {
                    commands.push(make_cmd(
                        now,
                        next_command_id,
                        Command::SetCoolingPower {
                            power: self.cooling_power,
                        },
                    ));
                }
            }
            Level::Results => {}
        }

        commands
    }
}
