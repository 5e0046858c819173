use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::nutrition::{ActivityLevel, NutritionError, Profile};

/// Everything a patient records about themselves. Age is informational;
/// the rest feeds limit calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: u8,
    pub ckd_stage: u8,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
}

impl PatientProfile {
    pub fn engine_profile(&self) -> Profile {
        Profile {
            ckd_stage: self.ckd_stage,
            weight_kg: self.weight_kg,
            activity_level: self.activity_level,
        }
    }

    pub fn validate(&self) -> Result<(), NutritionError> {
        if !(1..=120).contains(&self.age) {
            return Err(NutritionError::InvalidProfile(format!(
                "age must be between 1 and 120, got {}",
                self.age
            )));
        }
        self.engine_profile().validate()
    }
}

/// Profile columns of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub age: i16,
    pub ckd_stage: i16,
    pub weight_kg: f64,
    pub activity_level: String,
}

impl TryFrom<ProfileRow> for PatientProfile {
    type Error = NutritionError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let age = u8::try_from(row.age)
            .map_err(|_| NutritionError::InvalidProfile(format!("age out of range: {}", row.age)))?;
        let ckd_stage = u8::try_from(row.ckd_stage).map_err(|_| {
            NutritionError::InvalidProfile(format!("ckd stage out of range: {}", row.ckd_stage))
        })?;
        let profile = PatientProfile {
            age,
            ckd_stage,
            weight_kg: row.weight_kg,
            activity_level: row.activity_level.parse()?,
        };
        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(stage: i16, activity: &str) -> ProfileRow {
        ProfileRow {
            age: 58,
            ckd_stage: stage,
            weight_kg: 72.5,
            activity_level: activity.to_string(),
        }
    }

    #[test]
    fn converts_valid_row() {
        let profile = PatientProfile::try_from(row(4, "light")).unwrap();
        assert_eq!(profile.ckd_stage, 4);
        assert_eq!(profile.activity_level, ActivityLevel::Light);
        assert_eq!(profile.engine_profile().weight_kg, 72.5);
    }

    #[test]
    fn rejects_corrupt_rows() {
        assert!(matches!(
            PatientProfile::try_from(row(9, "light")),
            Err(NutritionError::InvalidProfile(_))
        ));
        assert!(matches!(
            PatientProfile::try_from(row(-1, "light")),
            Err(NutritionError::InvalidProfile(_))
        ));
        assert!(matches!(
            PatientProfile::try_from(row(2, "marathoner")),
            Err(NutritionError::InvalidProfile(_))
        ));
    }

    #[test]
    fn deserializes_snake_case_activity() {
        let profile: PatientProfile = serde_json::from_str(
            r#"{"age": 40, "ckd_stage": 2, "weight_kg": 80, "activity_level": "very_active"}"#,
        )
        .unwrap();
        assert_eq!(profile.activity_level, ActivityLevel::VeryActive);
        assert!(profile.validate().is_ok());

        let too_old = PatientProfile { age: 130, ..profile };
        assert!(too_old.validate().is_err());
    }
}
