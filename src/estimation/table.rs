use std::sync::Arc;

use async_trait::async_trait;

use super::{Estimate, EstimateRequest, EstimationError, EstimationStrategy};
use crate::nutrition::NutrientTable;

/// Nutrient content per 100 g of a food.
pub type Per100g = NutrientTable<f64>;

const fn per_100g(protein: f64, potassium: f64, phosphorus: f64, sodium: f64) -> Per100g {
    NutrientTable {
        protein,
        potassium,
        phosphorus,
        sodium,
    }
}

const BUILTIN_FOODS: &[(&str, Per100g)] = &[
    ("chicken breast", per_100g(31.0, 220.0, 220.0, 74.0)),
    ("grilled chicken", per_100g(31.0, 220.0, 220.0, 74.0)),
    ("salmon", per_100g(25.0, 363.0, 200.0, 44.0)),
    ("banana", per_100g(1.1, 358.0, 22.0, 1.0)),
    ("apple", per_100g(0.3, 107.0, 12.0, 1.0)),
    ("rice", per_100g(2.7, 35.0, 43.0, 1.0)),
    ("broccoli", per_100g(2.8, 316.0, 66.0, 33.0)),
    ("potato", per_100g(2.0, 421.0, 57.0, 6.0)),
    ("egg", per_100g(13.0, 138.0, 191.0, 140.0)),
    ("milk", per_100g(3.4, 150.0, 93.0, 44.0)),
    ("bread", per_100g(9.0, 98.0, 98.0, 491.0)),
    ("cheese", per_100g(25.0, 98.0, 512.0, 621.0)),
    ("yogurt", per_100g(10.0, 141.0, 135.0, 36.0)),
    ("orange", per_100g(0.9, 181.0, 14.0, 0.0)),
    ("spinach", per_100g(2.9, 558.0, 49.0, 79.0)),
];

/// Read-only food reference data. Built once and shared through `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodTable {
    foods: Vec<(String, Per100g)>,
}

impl FoodTable {
    pub fn new(foods: impl IntoIterator<Item = (String, Per100g)>) -> Self {
        Self {
            foods: foods
                .into_iter()
                .map(|(name, values)| (normalize(&name), values))
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_FOODS
                .iter()
                .map(|(name, values)| (name.to_string(), *values)),
        )
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    /// Exact name first, then the first entry (in table order) where
    /// either name contains the other.
    pub fn lookup(&self, food_name: &str) -> Option<&Per100g> {
        let wanted = normalize(food_name);
        if wanted.is_empty() {
            return None;
        }
        self.foods
            .iter()
            .find(|(name, _)| *name == wanted)
            .or_else(|| {
                self.foods
                    .iter()
                    .find(|(name, _)| {
                        wanted.contains(name.as_str()) || name.contains(wanted.as_str())
                    })
            })
            .map(|(_, values)| values)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct ReferenceTableStrategy {
    table: Arc<FoodTable>,
}

impl ReferenceTableStrategy {
    const NUTRIENT_CONFIDENCE: NutrientTable<f64> = NutrientTable {
        protein: 0.85,
        potassium: 0.75,
        phosphorus: 0.80,
        sodium: 0.90,
    };

    pub fn new(table: Arc<FoodTable>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl EstimationStrategy for ReferenceTableStrategy {
    fn name(&self) -> &'static str {
        "reference_table"
    }

    fn confidence(&self) -> f64 {
        0.82
    }

    async fn estimate(
        &self,
        request: &EstimateRequest,
    ) -> Result<Option<Estimate>, EstimationError> {
        let Some(food_name) = request.food_name.as_deref() else {
            return Ok(None);
        };
        Ok(self.table.lookup(food_name).map(|values| {
            Estimate::scaled(
                food_name.to_string(),
                request.portion_size,
                values,
                &Self::NUTRIENT_CONFIDENCE,
                self.confidence(),
                self.name(),
            )
        }))
    }
}
