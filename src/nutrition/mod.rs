//! Nutrient budget and alert engine.
//!
//! Pure functions only: limits from a profile, per-day aggregation of
//! logged meals, status classification and alert generation. Callers
//! fetch entries and profiles; nothing in here touches I/O.

pub mod aggregate;
pub mod alerts;
pub mod dates;
pub mod error;
pub mod limits;
pub mod status;
pub mod summary;
pub mod types;

pub use alerts::Alert;
pub use error::NutritionError;
pub use limits::compute_limits;
pub use summary::{daily_alerts, daily_summary, weekly_summary, DailySummary, WeeklySummary};
pub use types::{
    ActivityLevel, FoodLogEntry, Nutrient, NutrientAmount, NutrientLimitSet, NutrientTable, Profile,
};
