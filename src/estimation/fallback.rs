use async_trait::async_trait;

use super::{Estimate, EstimateRequest, EstimationError, EstimationStrategy};
use crate::nutrition::NutrientTable;

/// Photo recognition stand-in: reports a generic detected food. Values
/// are per serving and are not scaled by portion.
pub struct ImageStrategy;

impl ImageStrategy {
    const DETECTED: NutrientTable<f64> = NutrientTable {
        protein: 20.0,
        potassium: 300.0,
        phosphorus: 150.0,
        sodium: 200.0,
    };
    const NUTRIENT_CONFIDENCE: NutrientTable<f64> = NutrientTable {
        protein: 0.70,
        potassium: 0.65,
        phosphorus: 0.70,
        sodium: 0.75,
    };
}

/// JPEG, PNG or WebP by magic bytes.
fn is_supported_image(bytes: &[u8]) -> bool {
    bytes.starts_with(b"\xff\xd8\xff")
        || bytes.starts_with(b"\x89PNG\r\n\x1a\n")
        || (bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP")
}

#[async_trait]
impl EstimationStrategy for ImageStrategy {
    fn name(&self) -> &'static str {
        "image"
    }

    fn confidence(&self) -> f64 {
        0.70
    }

    async fn estimate(
        &self,
        request: &EstimateRequest,
    ) -> Result<Option<Estimate>, EstimationError> {
        let Some(image) = request.image.as_ref().filter(|i| !i.is_empty()) else {
            return Ok(None);
        };
        if !is_supported_image(image) {
            return Err(EstimationError::Strategy {
                strategy: self.name(),
                message: format!("unsupported image format ({} bytes)", image.len()),
            });
        }
        Ok(Some(Estimate::rounded(
            "Detected Food".to_string(),
            request.portion_size,
            &Self::DETECTED,
            &Self::NUTRIENT_CONFIDENCE,
            self.confidence(),
            self.name(),
        )))
    }
}

/// Last resort for unknown foods.
pub struct GenericDefaultStrategy;

impl GenericDefaultStrategy {
    const PER_100G: NutrientTable<f64> = NutrientTable {
        protein: 10.0,
        potassium: 200.0,
        phosphorus: 100.0,
        sodium: 100.0,
    };
}

#[async_trait]
impl EstimationStrategy for GenericDefaultStrategy {
    fn name(&self) -> &'static str {
        "generic_default"
    }

    fn confidence(&self) -> f64 {
        0.65
    }

    async fn estimate(
        &self,
        request: &EstimateRequest,
    ) -> Result<Option<Estimate>, EstimationError> {
        let Some(food_name) = request.food_name.as_deref().filter(|n| !n.trim().is_empty()) else {
            return Ok(None);
        };
        Ok(Some(Estimate::scaled(
            food_name.to_string(),
            request.portion_size,
            &Self::PER_100G,
            &NutrientTable::from_fn(|_| 0.60),
            self.confidence(),
            self.name(),
        )))
    }
}
