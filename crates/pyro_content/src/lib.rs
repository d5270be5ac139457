//! Tuning-constants loading shared between pyro_cli and pyro_driver.

use std::path::Path;

use anyhow::{Context, Result};
use pyro_core::Constants;

/// Validates loaded constants, panicking on any authoring error.
///
/// Catches mistakes like: an inverted condensation band, a zero sorting
/// target, or yield coefficients that stop summing to 1 per input unit.
pub fn validate_constants(constants: &Constants) {
    assert!(
        constants.beam_heat_rate > 0.0,
        "beam_heat_rate must be positive, got {}",
        constants.beam_heat_rate
    );
    assert!(
        constants.cell_heat_cap >= constants.heat_target_avg,
        "cell_heat_cap {} below heat_target_avg {} makes heating unwinnable",
        constants.cell_heat_cap,
        constants.heat_target_avg
    );
    assert!(
        constants.uniformity_penalty_cap > 0.0 && constants.uniformity_penalty_cap < 1.0,
        "uniformity_penalty_cap must sit in (0, 1), got {}",
        constants.uniformity_penalty_cap
    );

    assert!(
        constants.condense_band_min < constants.condense_band_max,
        "condensation band is inverted: ({}, {})",
        constants.condense_band_min,
        constants.condense_band_max
    );
    assert!(
        constants.band_hint_min >= constants.condense_band_min
            && constants.band_hint_max <= constants.condense_band_max,
        "display band must sit inside the condensation band"
    );
    assert!(
        constants.cooling_relax_rate > 0.0 && constants.cooling_relax_rate < 1.0,
        "cooling_relax_rate must sit in (0, 1), got {}",
        constants.cooling_relax_rate
    );
    assert!(
        constants.efficiency_ema_alpha > 0.0 && constants.efficiency_ema_alpha <= 1.0,
        "efficiency_ema_alpha must sit in (0, 1], got {}",
        constants.efficiency_ema_alpha
    );
    assert!(
        constants.liquid_rate_per_tick > 0.0,
        "liquid_rate_per_tick must be positive, got {}",
        constants.liquid_rate_per_tick
    );

    assert!(
        constants.total_to_sort > 0,
        "total_to_sort must be positive"
    );
    assert!(
        constants.max_items_in_flight > 0,
        "max_items_in_flight must be positive"
    );
    assert!(
        constants.gas_cutoff_pct > constants.fuel_bias_floor_pct
            && constants.gas_cutoff_pct <= 100.0,
        "gas_cutoff_pct {} must sit between the fuel floor and 100",
        constants.gas_cutoff_pct
    );
    assert!(
        constants.mistake_penalty >= 0.0,
        "mistake_penalty must not be negative, got {}",
        constants.mistake_penalty
    );

    let plastic_sum = constants.fuel_yield_per_plastic
        + constants.gas_yield_per_plastic
        + constants.char_yield_per_plastic;
    assert!(
        (plastic_sum - 1.0).abs() < 1e-5,
        "plastic yield coefficients must sum to 1, got {plastic_sum}"
    );
    let biomass_sum = constants.fuel_yield_per_biomass
        + constants.gas_yield_per_biomass
        + constants.char_yield_per_biomass;
    assert!(
        (biomass_sum - 1.0).abs() < 1e-5,
        "biomass yield coefficients must sum to 1, got {biomass_sum}"
    );

    assert!(
        constants.initial_plastic_pct <= 100,
        "initial_plastic_pct must not exceed 100, got {}",
        constants.initial_plastic_pct
    );
    assert!(
        constants.feedstock_preview_particles > 0,
        "feedstock_preview_particles must be positive"
    );
}

pub fn load_constants(content_dir: &str) -> Result<Constants> {
    let path = Path::new(content_dir).join("constants.json");
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
    )
    .with_context(|| format!("parsing {}", path.display()))?;
    validate_constants(&constants);
    Ok(constants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyro_core::test_fixtures::base_constants;

    #[test]
    fn test_valid_constants_pass_validation() {
        let constants = base_constants();
        validate_constants(&constants); // should not panic
    }

    #[test]
    #[should_panic(expected = "band is inverted")]
    fn test_inverted_band_panics() {
        let mut constants = base_constants();
        constants.condense_band_min = 45.0;
        constants.condense_band_max = 15.0;
        validate_constants(&constants);
    }

    #[test]
    #[should_panic(expected = "total_to_sort")]
    fn test_zero_sort_target_panics() {
        let mut constants = base_constants();
        constants.total_to_sort = 0;
        validate_constants(&constants);
    }

    #[test]
    #[should_panic(expected = "must sum to 1")]
    fn test_bad_yield_coefficients_panic() {
        let mut constants = base_constants();
        constants.fuel_yield_per_plastic = 0.9;
        validate_constants(&constants);
    }

    #[test]
    #[should_panic(expected = "unwinnable")]
    fn test_cap_below_target_panics() {
        let mut constants = base_constants();
        constants.cell_heat_cap = 0.8;
        validate_constants(&constants);
    }

    #[test]
    fn test_load_constants_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json = serde_json::to_string_pretty(&base_constants()).expect("serialize");
        std::fs::write(dir.path().join("constants.json"), json).expect("write");

        let loaded = load_constants(dir.path().to_str().expect("utf-8 path")).expect("load");
        assert_eq!(loaded.total_to_sort, 15);
        assert!((loaded.beam_heat_rate - 0.02).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_constants_missing_file_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_constants(dir.path().to_str().expect("utf-8 path"))
            .expect_err("missing file must error");
        assert!(err.to_string().contains("constants.json"));
    }
}
