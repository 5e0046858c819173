use serde::{Deserialize, Serialize};

use super::error::{NutritionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientStatus {
    Safe,
    Low,
    Warning,
    High,
}

impl NutrientStatus {
    pub fn message(self) -> &'static str {
        match self {
            NutrientStatus::High => "Above daily limit",
            NutrientStatus::Warning => "Getting close to limit",
            NutrientStatus::Low => "Below recommended amount",
            NutrientStatus::Safe => "In safe range",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            NutrientStatus::High => "red",
            NutrientStatus::Warning | NutrientStatus::Low => "yellow",
            NutrientStatus::Safe => "green",
        }
    }
}

pub fn percent_of_limit(intake: f64, limit: f64) -> Result<f64> {
    if !limit.is_finite() || limit <= 0.0 {
        return Err(NutritionError::InvalidLimit { limit });
    }
    Ok(intake / limit * 100.0)
}

/// Bands are checked high, warning, low, then safe, so exactly 100, 80
/// and 50 percent land in high, warning and safe respectively.
pub fn classify(intake: f64, limit: f64) -> Result<NutrientStatus> {
    let pct = percent_of_limit(intake, limit)?;
    let status = if pct >= 100.0 {
        NutrientStatus::High
    } else if pct >= 80.0 {
        NutrientStatus::Warning
    } else if pct < 50.0 {
        NutrientStatus::Low
    } else {
        NutrientStatus::Safe
    };
    Ok(status)
}

/// Status of one nutrient as shown on the daily summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    pub status: NutrientStatus,
    pub message: &'static str,
    pub color: &'static str,
    pub percent_of_limit: f64,
}

impl StatusReport {
    pub fn evaluate(intake: f64, limit: f64) -> Result<Self> {
        let status = classify(intake, limit)?;
        Ok(Self {
            status,
            message: status.message(),
            color: status.color(),
            percent_of_limit: percent_of_limit(intake, limit)?,
        })
    }
}
