use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::estimation::Estimate;
use crate::nutrition::{FoodLogEntry, NutrientAmount, NutrientTable};

#[derive(Debug, Deserialize)]
pub struct EstimateBody {
    pub food_name: Option<String>,
    pub portion_size: Option<f64>,
    pub image: Option<serde_bytes::ByteBuf>,
}

/// Estimates are suggestions; the client must show a disclaimer.
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub estimate: Estimate,
    pub disclaimer: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggedAmount {
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFoodLogRequest {
    pub food_name: String,
    pub portion_size: f64,
    #[serde(default)]
    pub portion_unit: Option<String>,
    pub nutrients: NutrientTable<Option<LoggedAmount>>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub logged_at: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct FoodLogView {
    pub id: Uuid,
    pub food_name: String,
    pub portion_size: f64,
    pub portion_unit: String,
    pub nutrients: NutrientTable<Option<NutrientAmount>>,
    pub confidence_score: f64,
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

impl From<FoodLogEntry> for FoodLogView {
    fn from(entry: FoodLogEntry) -> Self {
        Self {
            id: entry.id,
            nutrients: entry.nutrients.map(|n, v| v.map(|v| n.amount(v))),
            food_name: entry.food_name,
            portion_size: entry.portion_size,
            portion_unit: entry.portion_unit,
            confidence_score: entry.confidence_score,
            image_url: entry.image_url,
            logged_at: entry.logged_at,
        }
    }
}
