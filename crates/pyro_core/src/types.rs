//! Type definitions for `pyro_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the game engine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(CommandId);
string_id!(EventId);

/// Sort-item ids are monotonically increasing integers, unique for the whole
/// session (they are never reused, even across resets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item_{:06}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// The five stages of a playthrough, in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Input,
    Heating,
    Sorting,
    Cooling,
    Results,
}

impl Level {
    pub fn label(self) -> &'static str {
        match self {
            Level::Input => "input",
            Level::Heating => "heating",
            Level::Sorting => "sorting",
            Level::Cooling => "cooling",
            Level::Results => "results",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The three pyrolysis outputs; also the three sorting bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Fuel,
    Gas,
    Char,
}

impl OutputKind {
    pub fn label(self) -> &'static str {
        match self {
            OutputKind::Fuel => "fuel",
            OutputKind::Gas => "gas",
            OutputKind::Char => "char",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Feedstock particle kinds for the hopper preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Plastic,
    Biomass,
}

/// Per-level simulation lifecycle. A simulation commits its score on the
/// `Running → Done` edge, so the commit fires exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    Running,
    Done,
}

/// Temperature hint shown to the player during cooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandStatus {
    TooCold,
    Optimal,
    TooHot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    pub level: Level,
    pub feedstock: FeedstockMix,
    pub scores: ProcessScores,
    pub heating: HeatingState,
    pub cooling: CoolingState,
    pub sorting: SortingState,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
    pub seed: u64,
    pub schema_version: u32,
}

/// Complementary percentages; `plastic_pct + biomass_pct == 100` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedstockMix {
    pub plastic_pct: u8,
    pub biomass_pct: u8,
}

/// Process scores in [0, 1], each written exactly once per playthrough.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessScores {
    pub heating: f32,
    pub sorting: f32,
    pub cooling: f32,
}

/// A cell on the reactor grid. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPos {
    pub x: u8,
    pub y: u8,
}

/// Reactor chamber state. `cells` always holds exactly
/// [`CELL_COUNT`](crate::CELL_COUNT) values in row-major order; cell values
/// only ever increase (up to the per-cell cap), never decay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatingState {
    pub cells: Vec<f32>,
    pub beam: Option<CellPos>,
    pub phase: SimPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoolingState {
    pub temperature: f32,
    pub cooling_power: u8,
    pub liquid_level: f32,
    /// Exponential moving average of the instantaneous condensation
    /// efficiency; only updated while the temperature sits in the sweet spot.
    pub efficiency: f32,
    pub phase: SimPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortingState {
    /// Items currently on the belt, oldest first. Never more than
    /// `Constants::max_items_in_flight`.
    pub in_flight: Vec<SortItem>,
    pub sorted_count: u32,
    pub mistakes: u32,
    pub ticks_until_spawn: u64,
    pub phase: SimPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    pub id: ItemId,
    pub kind: OutputKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_item_id: u64,
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_tick: u64,
    pub execute_at_tick: u64,
    pub command: Command,
}

/// Player inputs. All of these originate from the presentation layer; the
/// engine applies them at the scheduled tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    /// Set the plastic percentage; biomass is derived as the complement.
    SetFeedstock { plastic_pct: u8 },
    /// Aim the microwave beam at a grid cell (held until cleared or moved).
    AimBeam { cell: CellPos },
    /// Pointer left the reactor; stop applying heat.
    ClearBeam,
    SetCoolingPower { power: u8 },
    /// Drop an in-flight item into a bin. Unknown item ids are ignored
    /// (stale drag events from the presentation layer).
    ClassifyItem { item: ItemId, bin: OutputKind },
    /// Move to the next level. Rejected (with a `CommandRejected` event) if
    /// the active simulation has not reached its terminal condition.
    AdvanceLevel,
    ResetGame,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    LevelEntered {
        level: Level,
    },
    FeedstockSet {
        plastic_pct: u8,
        biomass_pct: u8,
    },
    ItemSpawned {
        item: ItemId,
        kind: OutputKind,
    },
    /// Correct classification.
    ItemSorted {
        item: ItemId,
        bin: OutputKind,
    },
    /// Wrong bin; `actual` is the kind that was missed.
    ItemMissed {
        item: ItemId,
        actual: OutputKind,
    },
    ScoreCommitted {
        level: Level,
        score: f32,
    },
    LevelCompleted {
        level: Level,
    },
    GameReset,
    CommandRejected {
        command: CommandId,
        reason: String,
    },
    /// Only emitted at `EventLevel::Debug`.
    HeatingTick {
        avg_heat: f32,
        uniformity: f32,
    },
    /// Only emitted at `EventLevel::Debug`.
    CoolingTick {
        temperature: f32,
        liquid_level: f32,
        efficiency: f32,
    },
}

// ---------------------------------------------------------------------------
// Tuning constants
// ---------------------------------------------------------------------------

/// All gameplay tuning in one place, loaded from `content/constants.json`.
/// Grid dimensions are structural (see `heating::GRID_WIDTH`) and are not
/// configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    // Heating
    pub beam_heat_rate: f32,
    pub beam_radius_cells: f32,
    /// Per-cell clamp; slightly above 1.0 so cells may overheat a little.
    pub cell_heat_cap: f32,
    pub heat_target_avg: f32,
    pub uniformity_variance_divisor: f32,
    pub uniformity_penalty_cap: f32,
    /// Reference frame period for the heating driver (any tick source
    /// at 30 Hz or better reproduces the same dynamics).
    pub heating_frame_ms: u64,

    // Cooling
    pub initial_temperature: f32,
    pub cooling_relax_rate: f32,
    pub condense_band_min: f32,
    pub condense_band_max: f32,
    pub efficiency_ema_alpha: f32,
    pub liquid_rate_per_tick: f32,
    pub liquid_full_level: f32,
    /// Temperature hints shown to the player (narrower than the band).
    pub band_hint_min: f32,
    pub band_hint_max: f32,
    pub cooling_tick_ms: u64,

    // Sorting
    pub total_to_sort: u32,
    pub max_items_in_flight: usize,
    pub spawn_delay_ticks: u64,
    pub sorting_tick_ms: u64,
    pub mistake_penalty: f32,
    pub fuel_bias_floor_pct: f32,
    pub fuel_bias_per_plastic: f32,
    pub gas_cutoff_pct: f32,

    // Results
    pub fuel_yield_per_plastic: f32,
    pub fuel_yield_per_biomass: f32,
    pub gas_yield_per_plastic: f32,
    pub gas_yield_per_biomass: f32,
    pub char_yield_per_plastic: f32,
    pub char_yield_per_biomass: f32,

    // Session
    pub initial_plastic_pct: u8,
    pub feedstock_preview_particles: u32,
}
