//! Shared test fixtures for pyro_core and downstream crates.
//!
//! `base_constants()` mirrors the shipped `content/constants.json`; tests
//! that need faster pacing override individual fields (usually
//! `spawn_delay_ticks`).

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::types::{Constants, GameState};

/// Production tuning values.
pub fn base_constants() -> Constants {
    Constants {
        beam_heat_rate: 0.02,
        beam_radius_cells: 1.5,
        cell_heat_cap: 1.1,
        heat_target_avg: 1.0,
        uniformity_variance_divisor: 2.0,
        uniformity_penalty_cap: 0.9,
        heating_frame_ms: 16,

        initial_temperature: 100.0,
        cooling_relax_rate: 0.05,
        condense_band_min: 15.0,
        condense_band_max: 45.0,
        efficiency_ema_alpha: 0.1,
        liquid_rate_per_tick: 0.5,
        liquid_full_level: 100.0,
        band_hint_min: 20.0,
        band_hint_max: 40.0,
        cooling_tick_ms: 50,

        total_to_sort: 15,
        max_items_in_flight: 3,
        spawn_delay_ticks: 30,
        sorting_tick_ms: 50,
        mistake_penalty: 0.5,
        fuel_bias_floor_pct: 10.0,
        fuel_bias_per_plastic: 0.7,
        gas_cutoff_pct: 80.0,

        fuel_yield_per_plastic: 0.7,
        fuel_yield_per_biomass: 0.2,
        gas_yield_per_plastic: 0.2,
        gas_yield_per_biomass: 0.4,
        char_yield_per_plastic: 0.1,
        char_yield_per_biomass: 0.4,

        initial_plastic_pct: 50,
        feedstock_preview_particles: 30,
    }
}

/// Standard session: input screen, 50/50 mix, zero scores.
pub fn base_state(constants: &Constants) -> GameState {
    GameState::new(constants, 42)
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
