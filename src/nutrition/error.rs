use thiserror::Error;
use uuid::Uuid;

use super::types::Nutrient;

/// Failure kinds of the budget engine. Nothing is mutated before any of
/// these is returned, so callers never see partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("invalid limit {limit}: must be a positive number")]
    InvalidLimit { limit: f64 },

    #[error("malformed food log entry {entry_id}: missing or invalid {nutrient} value")]
    MalformedEntry { entry_id: Uuid, nutrient: Nutrient },
}

pub type Result<T> = std::result::Result<T, NutritionError>;
