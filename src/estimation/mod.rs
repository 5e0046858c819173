//! Nutrient estimation for a food name or photo.
//!
//! An [`Estimator`] holds an ordered list of strategies. They are tried in
//! turn and the first one that produces an estimate wins; a strategy that
//! errors is logged and skipped. None of this feeds the budget engine
//! directly: an estimate only pre-fills a food log the user then saves.

mod fallback;
mod table;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::nutrition::{Nutrient, NutrientAmount, NutrientTable};

pub use fallback::{GenericDefaultStrategy, ImageStrategy};
pub use table::{FoodTable, ReferenceTableStrategy};

pub const DEFAULT_PORTION_G: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct EstimateRequest {
    pub food_name: Option<String>,
    pub portion_size: f64,
    pub image: Option<Bytes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimatedAmount {
    #[serde(flatten)]
    pub amount: NutrientAmount,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub food_name: String,
    pub portion_size: f64,
    pub nutrients: NutrientTable<EstimatedAmount>,
    pub confidence_score: f64,
    pub source: &'static str,
}

impl Estimate {
    /// Builds an estimate from per-100 g values scaled to `portion_size`.
    pub fn scaled(
        food_name: String,
        portion_size: f64,
        per_100g: &NutrientTable<f64>,
        confidences: &NutrientTable<f64>,
        confidence_score: f64,
        source: &'static str,
    ) -> Self {
        let scale = portion_size / 100.0;
        let values = per_100g.map(|_, v| v * scale);
        Self::rounded(food_name, portion_size, &values, confidences, confidence_score, source)
    }

    /// Protein keeps one decimal, minerals are whole milligrams.
    pub fn rounded(
        food_name: String,
        portion_size: f64,
        values: &NutrientTable<f64>,
        confidences: &NutrientTable<f64>,
        confidence_score: f64,
        source: &'static str,
    ) -> Self {
        let nutrients = NutrientTable::from_fn(|n| {
            let raw = *values.get(n);
            let value = match n {
                Nutrient::Protein => (raw * 10.0).round() / 10.0,
                _ => raw.round(),
            };
            EstimatedAmount {
                amount: n.amount(value),
                confidence: *confidences.get(n),
            }
        });
        Self {
            food_name,
            portion_size,
            nutrients,
            confidence_score,
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("estimation strategy {strategy} failed: {message}")]
    Strategy {
        strategy: &'static str,
        message: String,
    },

    #[error("no estimation strategy could handle the request")]
    Exhausted,
}

#[async_trait]
pub trait EstimationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Overall confidence this strategy attaches to its estimates.
    fn confidence(&self) -> f64;

    /// `Ok(None)` means the strategy does not apply to this request.
    async fn estimate(
        &self,
        request: &EstimateRequest,
    ) -> Result<Option<Estimate>, EstimationError>;
}

#[derive(Clone)]
pub struct Estimator {
    strategies: Vec<Arc<dyn EstimationStrategy>>,
}

impl Estimator {
    pub fn new(strategies: Vec<Arc<dyn EstimationStrategy>>) -> Self {
        Self { strategies }
    }

    /// Photo first, then the reference table, then generic defaults.
    pub fn with_reference_table(table: Arc<FoodTable>) -> Self {
        Self::new(vec![
            Arc::new(ImageStrategy),
            Arc::new(ReferenceTableStrategy::new(table)),
            Arc::new(GenericDefaultStrategy),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn estimate(&self, request: &EstimateRequest) -> Result<Estimate, EstimationError> {
        for strategy in &self.strategies {
            match strategy.estimate(request).await {
                Ok(Some(estimate)) => {
                    debug!(
                        strategy = strategy.name(),
                        confidence = estimate.confidence_score,
                        "estimate produced"
                    );
                    return Ok(estimate);
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        strategy = strategy.name(),
                        error = %e,
                        "estimation strategy failed, falling back"
                    );
                }
            }
        }
        Err(EstimationError::Exhausted)
    }
}
