//! Daily limit rules per CKD stage band.
//!
//! The rules live in one static table so each band can be audited and
//! tested on its own. Sodium is the same for every band.

use std::ops::RangeInclusive;

use super::error::{NutritionError, Result};
use super::types::{Nutrient, NutrientLimitSet, NutrientTable, Profile};

pub const SODIUM_LIMIT_MG: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageBand {
    /// Stages 1–2.
    Early,
    /// Stage 3.
    Moderate,
    /// Stages 4–5.
    Advanced,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandRule {
    pub band: StageBand,
    pub stages: RangeInclusive<u8>,
    pub protein_g_per_kg: f64,
    pub potassium_mg: f64,
    pub phosphorus_mg: f64,
    pub sodium_mg: f64,
}

pub const BAND_RULES: [BandRule; 3] = [
    BandRule {
        band: StageBand::Early,
        stages: 1..=2,
        protein_g_per_kg: 0.9,
        potassium_mg: 4700.0,
        phosphorus_mg: 1000.0,
        sodium_mg: SODIUM_LIMIT_MG,
    },
    BandRule {
        band: StageBand::Moderate,
        stages: 3..=3,
        protein_g_per_kg: 0.8,
        potassium_mg: 3000.0,
        phosphorus_mg: 800.0,
        sodium_mg: SODIUM_LIMIT_MG,
    },
    BandRule {
        band: StageBand::Advanced,
        stages: 4..=5,
        protein_g_per_kg: 0.7,
        potassium_mg: 2000.0,
        phosphorus_mg: 600.0,
        sodium_mg: SODIUM_LIMIT_MG,
    },
];

impl BandRule {
    pub fn for_stage(stage: u8) -> Result<&'static BandRule> {
        BAND_RULES
            .iter()
            .find(|rule| rule.stages.contains(&stage))
            .ok_or_else(|| {
                NutritionError::InvalidProfile(format!(
                    "ckd stage must be between 1 and 5, got {stage}"
                ))
            })
    }

    pub fn limits_for(&self, weight_kg: f64) -> NutrientLimitSet {
        NutrientTable::from_fn(|n| {
            let value = match n {
                Nutrient::Protein => weight_kg * self.protein_g_per_kg,
                Nutrient::Potassium => self.potassium_mg,
                Nutrient::Phosphorus => self.phosphorus_mg,
                Nutrient::Sodium => self.sodium_mg,
            };
            n.amount(value)
        })
    }
}

pub fn compute_limits(profile: &Profile) -> Result<NutrientLimitSet> {
    profile.validate()?;
    let rule = BandRule::for_stage(profile.ckd_stage)?;
    Ok(rule.limits_for(profile.weight_kg))
}
