//! Feedstock mix helpers.

use rand::Rng;

use crate::types::ParticleKind;

/// Draw `count` hopper-preview particles; each is plastic with probability
/// `plastic_pct / 100`, biomass otherwise. Presentation renders these — the
/// split lives here so the distribution rule is not duplicated.
pub fn feedstock_preview(
    count: u32,
    plastic_pct: u8,
    rng: &mut impl Rng,
) -> Vec<ParticleKind> {
    (0..count)
        .map(|_| {
            if rng.gen_range(0.0..100.0) < f32::from(plastic_pct) {
                ParticleKind::Plastic
            } else {
                ParticleKind::Biomass
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::make_rng;

    #[test]
    fn all_plastic_at_100() {
        let mut rng = make_rng();
        let particles = feedstock_preview(50, 100, &mut rng);
        assert!(particles.iter().all(|p| *p == ParticleKind::Plastic));
    }

    #[test]
    fn all_biomass_at_0() {
        let mut rng = make_rng();
        let particles = feedstock_preview(50, 0, &mut rng);
        assert!(particles.iter().all(|p| *p == ParticleKind::Biomass));
    }

    #[test]
    fn mixed_ratio_produces_both_kinds() {
        let mut rng = make_rng();
        let particles = feedstock_preview(200, 50, &mut rng);
        assert!(particles.contains(&ParticleKind::Plastic));
        assert!(particles.contains(&ParticleKind::Biomass));
    }

    #[test]
    fn same_seed_same_preview() {
        let a = feedstock_preview(30, 65, &mut make_rng());
        let b = feedstock_preview(30, 65, &mut make_rng());
        assert_eq!(a, b);
    }
}
