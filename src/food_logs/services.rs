use thiserror::Error;
use time::OffsetDateTime;

use super::dto::CreateFoodLogRequest;
use crate::nutrition::{Nutrient, NutrientTable};

pub const DEFAULT_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_PORTION_UNIT: &str = "g";

#[derive(Debug, Error, PartialEq)]
pub enum InvalidLog {
    #[error("food_name must not be empty")]
    EmptyName,
    #[error("portion_size must be a positive number")]
    Portion,
    #[error("{0} is required")]
    MissingNutrient(Nutrient),
    #[error("{0} must be a non-negative number")]
    NegativeNutrient(Nutrient),
    #[error("{nutrient} is measured in {expected}, got {got:?}")]
    WrongUnit {
        nutrient: Nutrient,
        expected: &'static str,
        got: String,
    },
    #[error("confidence_score must be between 0 and 1")]
    Confidence,
}

/// A checked food log, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLog {
    pub food_name: String,
    pub portion_size: f64,
    pub portion_unit: String,
    pub nutrients: NutrientTable<f64>,
    pub confidence_score: f64,
    pub image_url: Option<String>,
    pub logged_at: OffsetDateTime,
}

pub fn validate_new_log(
    req: CreateFoodLogRequest,
    now: OffsetDateTime,
) -> Result<NewFoodLog, InvalidLog> {
    let food_name = req.food_name.trim().to_string();
    if food_name.is_empty() {
        return Err(InvalidLog::EmptyName);
    }
    if !(req.portion_size.is_finite() && req.portion_size > 0.0) {
        return Err(InvalidLog::Portion);
    }

    let nutrients = NutrientTable::try_from_fn(|n| {
        let logged = req.nutrients.get(n).as_ref().ok_or(InvalidLog::MissingNutrient(n))?;
        if let Some(unit) = logged.unit.as_deref() {
            if !unit.eq_ignore_ascii_case(n.unit().as_str()) {
                return Err(InvalidLog::WrongUnit {
                    nutrient: n,
                    expected: n.unit().as_str(),
                    got: unit.to_string(),
                });
            }
        }
        if !(logged.value.is_finite() && logged.value >= 0.0) {
            return Err(InvalidLog::NegativeNutrient(n));
        }
        Ok(logged.value)
    })?;

    let confidence_score = req.confidence_score.unwrap_or(DEFAULT_CONFIDENCE);
    if !(0.0..=1.0).contains(&confidence_score) {
        return Err(InvalidLog::Confidence);
    }

    let portion_unit = req
        .portion_unit
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_PORTION_UNIT.to_string());

    Ok(NewFoodLog {
        food_name,
        portion_size: req.portion_size,
        portion_unit,
        nutrients,
        confidence_score,
        image_url: req.image_url.filter(|u| !u.trim().is_empty()),
        logged_at: req.logged_at.unwrap_or(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn request(body: serde_json::Value) -> CreateFoodLogRequest {
        serde_json::from_value(body).unwrap()
    }

    fn full() -> serde_json::Value {
        serde_json::json!({
            "food_name": "  Salmon ",
            "portion_size": 120,
            "nutrients": {
                "protein": { "value": 30.0, "unit": "g" },
                "potassium": { "value": 436 },
                "phosphorus": { "value": 240 },
                "sodium": { "value": 53, "unit": "MG" }
            }
        })
    }

    #[test]
    fn fills_defaults() {
        let now = datetime!(2025-05-01 12:00 UTC);
        let log = validate_new_log(request(full()), now).unwrap();
        assert_eq!(log.food_name, "Salmon");
        assert_eq!(log.portion_unit, "g");
        assert_eq!(log.confidence_score, 0.8);
        assert_eq!(log.logged_at, now);
        assert_eq!(log.nutrients.sodium, 53.0);
    }

    #[test]
    fn rejects_bad_fields() {
        let now = datetime!(2025-05-01 12:00 UTC);

        let mut body = full();
        body["food_name"] = "   ".into();
        assert_eq!(validate_new_log(request(body), now), Err(InvalidLog::EmptyName));

        let mut body = full();
        body["portion_size"] = 0.into();
        assert_eq!(validate_new_log(request(body), now), Err(InvalidLog::Portion));

        let mut body = full();
        body["nutrients"]["phosphorus"] = serde_json::Value::Null;
        assert_eq!(
            validate_new_log(request(body), now),
            Err(InvalidLog::MissingNutrient(Nutrient::Phosphorus))
        );

        let mut body = full();
        body["nutrients"]["sodium"]["value"] = (-1).into();
        assert_eq!(
            validate_new_log(request(body), now),
            Err(InvalidLog::NegativeNutrient(Nutrient::Sodium))
        );

        let mut body = full();
        body["nutrients"]["protein"]["unit"] = "mg".into();
        assert!(matches!(
            validate_new_log(request(body), now),
            Err(InvalidLog::WrongUnit { nutrient: Nutrient::Protein, .. })
        ));

        let mut body = full();
        body["confidence_score"] = 1.5.into();
        assert_eq!(validate_new_log(request(body), now), Err(InvalidLog::Confidence));
    }
}
