use axum::http::StatusCode;
use tracing::error;

use crate::nutrition::NutritionError;

pub type Rejection = (StatusCode, String);

pub fn internal<E: std::fmt::Display>(e: E) -> Rejection {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// A bad profile is the caller's to fix. A bad limit or entry means stored
/// data is broken; neither is reported as a status the patient could act on.
pub fn nutrition(e: NutritionError) -> Rejection {
    match e {
        NutritionError::InvalidProfile(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        NutritionError::InvalidLimit { .. } | NutritionError::MalformedEntry { .. } => {
            error!(error = %e, "nutrition data cannot be evaluated");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
