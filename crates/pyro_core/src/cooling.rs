//! Syngas cooling: first-order relaxation toward the target temperature,
//! condensation inside the sweet spot, liquid accumulation.

use crate::types::{BandStatus, Constants, CoolingState, SimPhase};

/// Snapshot of one cooling tick. `committed` carries the efficiency score on
/// the tick the tank fills, and is `Some` exactly once.
pub(crate) struct CoolingTickReport {
    pub temperature: f32,
    pub liquid_level: f32,
    pub efficiency: f32,
    pub committed: Option<f32>,
}

/// Advance the cooling simulation by one tick. Returns `None` once done.
///
/// The condensation gate and the instantaneous efficiency are evaluated
/// against the temperature *before* this tick's relaxation step.
pub(crate) fn step(cooling: &mut CoolingState, constants: &Constants) -> Option<CoolingTickReport> {
    if cooling.phase == SimPhase::Done {
        return None;
    }

    let pre_temp = cooling.temperature;
    let target = constants.initial_temperature - f32::from(cooling.cooling_power);
    cooling.temperature = pre_temp + (target - pre_temp) * constants.cooling_relax_rate;

    if pre_temp > constants.condense_band_min && pre_temp < constants.condense_band_max {
        let instant = instant_efficiency(pre_temp, constants);
        cooling.efficiency = cooling.efficiency * (1.0 - constants.efficiency_ema_alpha)
            + instant * constants.efficiency_ema_alpha;
        cooling.liquid_level = (cooling.liquid_level + instant * constants.liquid_rate_per_tick)
            .min(constants.liquid_full_level);
    }

    let committed = if cooling.liquid_level >= constants.liquid_full_level {
        cooling.phase = SimPhase::Done;
        Some(cooling.efficiency)
    } else {
        None
    };

    Some(CoolingTickReport {
        temperature: cooling.temperature,
        liquid_level: cooling.liquid_level,
        efficiency: cooling.efficiency,
        committed,
    })
}

/// 1.0 at the band midpoint, falling linearly to 0 at either edge.
pub(crate) fn instant_efficiency(temperature: f32, constants: &Constants) -> f32 {
    let mid = (constants.condense_band_min + constants.condense_band_max) / 2.0;
    let half_width = (constants.condense_band_max - constants.condense_band_min) / 2.0;
    1.0 - (temperature - mid).abs() / half_width
}

/// Player-facing temperature hint, judged against the narrower display band.
pub fn band_status(temperature: f32, constants: &Constants) -> BandStatus {
    if temperature > constants.band_hint_max {
        BandStatus::TooHot
    } else if temperature < constants.band_hint_min {
        BandStatus::TooCold
    } else {
        BandStatus::Optimal
    }
}
