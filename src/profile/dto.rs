use serde::{Deserialize, Serialize};

use super::model::PatientProfile;
use crate::nutrition::{ActivityLevel, NutrientLimitSet};

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub age: Option<u8>,
    pub ckd_stage: Option<u8>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
}

impl UpdateProfileRequest {
    pub fn apply_to(&self, current: PatientProfile) -> PatientProfile {
        PatientProfile {
            age: self.age.unwrap_or(current.age),
            ckd_stage: self.ckd_stage.unwrap_or(current.ckd_stage),
            weight_kg: self.weight_kg.unwrap_or(current.weight_kg),
            activity_level: self.activity_level.unwrap_or(current.activity_level),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: PatientProfile,
    pub limits: NutrientLimitSet,
}
