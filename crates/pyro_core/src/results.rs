//! Final results: efficiency rating and per-output yield percentages.
//!
//! Pure derived view — nothing here is stored; the summary is recomputed
//! from `GameState` every time the results screen asks for it.

use serde::Serialize;

use crate::types::{Constants, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultsSummary {
    /// Mean of the three process scores, as a percentage in [0, 100].
    pub final_score: u32,
    pub fuel_yield: u32,
    pub gas_yield: u32,
    pub char_yield: u32,
    /// Whatever the yields do not account for. Independent rounding of the
    /// three yields can push this slightly off, even negative — expected.
    pub losses: i32,
}

/// Combine the stored process scores and the feedstock mix into the final
/// rating. Yield arithmetic runs in f64 to match the reference behavior.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn compute_results(state: &GameState, constants: &Constants) -> ResultsSummary {
    let score_sum = f64::from(state.scores.heating)
        + f64::from(state.scores.sorting)
        + f64::from(state.scores.cooling);
    let final_score = (score_sum / 3.0 * 100.0).round() as u32;

    let plastic = f64::from(state.feedstock.plastic_pct);
    let biomass = f64::from(state.feedstock.biomass_pct);
    let base_fuel = plastic * f64::from(constants.fuel_yield_per_plastic)
        + biomass * f64::from(constants.fuel_yield_per_biomass);
    let base_gas = plastic * f64::from(constants.gas_yield_per_plastic)
        + biomass * f64::from(constants.gas_yield_per_biomass);
    let base_char = plastic * f64::from(constants.char_yield_per_plastic)
        + biomass * f64::from(constants.char_yield_per_biomass);

    let multiplier = f64::from(final_score) / 100.0;
    let fuel_yield = (base_fuel * multiplier).round() as u32;
    let gas_yield = (base_gas * multiplier).round() as u32;
    let char_yield = (base_char * multiplier).round() as u32;
    let losses = 100 - (fuel_yield + gas_yield + char_yield) as i32;

    ResultsSummary {
        final_score,
        fuel_yield,
        gas_yield,
        char_yield,
        losses,
    }
}
