use serde::{Deserialize, Serialize};

use super::aggregate::DailyTotals;
use super::error::Result;
use super::status::{classify, NutrientStatus};
use super::types::{Nutrient, NutrientLimitSet};

pub const ALL_CLEAR_MESSAGE: &str = "Great job! All your nutrients are in a safe range today.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    High,
    Warning,
    Low,
    Info,
}

impl AlertKind {
    /// 1 is most urgent.
    pub fn priority(self) -> u8 {
        match self {
            AlertKind::High => 1,
            AlertKind::Warning | AlertKind::Low => 2,
            AlertKind::Info => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrient: Option<Nutrient>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
}

impl Alert {
    fn for_status(
        nutrient: Nutrient,
        status: NutrientStatus,
        intake: f64,
        limit: f64,
    ) -> Option<Self> {
        let (kind, message) = match status {
            NutrientStatus::High => (
                AlertKind::High,
                format!(
                    "Your {nutrient} intake is above your daily limit. \
                     Consider lighter meals tomorrow."
                ),
            ),
            NutrientStatus::Warning => (
                AlertKind::Warning,
                format!(
                    "You're getting close to your {nutrient} limit. \
                     Consider choosing lower-{nutrient} options for your next meal."
                ),
            ),
            NutrientStatus::Low => (
                AlertKind::Low,
                format!(
                    "Your {nutrient} is below recommended levels. \
                     Try adding foods rich in {nutrient}."
                ),
            ),
            NutrientStatus::Safe => return None,
        };
        Some(Self {
            kind,
            priority: kind.priority(),
            nutrient: Some(nutrient),
            message,
            intake: Some(intake),
            limit: Some(limit),
        })
    }

    fn all_clear() -> Self {
        Self {
            kind: AlertKind::Info,
            priority: AlertKind::Info.priority(),
            nutrient: None,
            message: ALL_CLEAR_MESSAGE.to_string(),
            intake: None,
            limit: None,
        }
    }
}

/// Alerts for one day, most urgent first. Equal priorities keep the
/// protein, potassium, phosphorus, sodium order.
pub fn generate_alerts(totals: &DailyTotals, limits: &NutrientLimitSet) -> Result<Vec<Alert>> {
    let mut alerts = Vec::new();
    for (nutrient, amount) in totals.totals.iter() {
        let intake = amount.value();
        let limit = limits.get(nutrient).value();
        let status = classify(intake, limit)?;
        alerts.extend(Alert::for_status(nutrient, status, intake, limit));
    }

    if alerts.is_empty() {
        alerts.push(Alert::all_clear());
    }

    // stable
    alerts.sort_by_key(|a| a.priority);
    Ok(alerts)
}
