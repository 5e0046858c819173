use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::{NutritionError, Result};

/// The four tracked nutrients, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Protein,
    Potassium,
    Phosphorus,
    Sodium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Protein,
        Nutrient::Potassium,
        Nutrient::Phosphorus,
        Nutrient::Sodium,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Nutrient::Protein => "protein",
            Nutrient::Potassium => "potassium",
            Nutrient::Phosphorus => "phosphorus",
            Nutrient::Sodium => "sodium",
        }
    }

    /// Units are fixed per nutrient and never converted.
    pub fn unit(self) -> Unit {
        match self {
            Nutrient::Protein => Unit::G,
            Nutrient::Potassium | Nutrient::Phosphorus | Nutrient::Sodium => Unit::Mg,
        }
    }

    pub fn amount(self, value: f64) -> NutrientAmount {
        NutrientAmount {
            nutrient: self,
            value,
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    G,
    Mg,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::G => "g",
            Unit::Mg => "mg",
        }
    }
}

/// A value of one nutrient. Serialized as `{ "value": .., "unit": ".." }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientAmount {
    nutrient: Nutrient,
    value: f64,
}

impl NutrientAmount {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.nutrient.unit()
    }

    pub(crate) fn add(&mut self, value: f64) {
        self.value += value;
    }
}

impl Serialize for NutrientAmount {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("NutrientAmount", 2)?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("unit", &self.unit())?;
        s.end()
    }
}

/// One slot per nutrient. Serializes as an object keyed by nutrient name.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientTable<T> {
    pub protein: T,
    pub potassium: T,
    pub phosphorus: T,
    pub sodium: T,
}

impl<T> NutrientTable<T> {
    pub fn from_fn(mut f: impl FnMut(Nutrient) -> T) -> Self {
        Self {
            protein: f(Nutrient::Protein),
            potassium: f(Nutrient::Potassium),
            phosphorus: f(Nutrient::Phosphorus),
            sodium: f(Nutrient::Sodium),
        }
    }

    pub fn try_from_fn<E>(
        mut f: impl FnMut(Nutrient) -> std::result::Result<T, E>,
    ) -> std::result::Result<Self, E> {
        Ok(Self {
            protein: f(Nutrient::Protein)?,
            potassium: f(Nutrient::Potassium)?,
            phosphorus: f(Nutrient::Phosphorus)?,
            sodium: f(Nutrient::Sodium)?,
        })
    }

    pub fn get(&self, nutrient: Nutrient) -> &T {
        match nutrient {
            Nutrient::Protein => &self.protein,
            Nutrient::Potassium => &self.potassium,
            Nutrient::Phosphorus => &self.phosphorus,
            Nutrient::Sodium => &self.sodium,
        }
    }

    pub fn get_mut(&mut self, nutrient: Nutrient) -> &mut T {
        match nutrient {
            Nutrient::Protein => &mut self.protein,
            Nutrient::Potassium => &mut self.potassium,
            Nutrient::Phosphorus => &mut self.phosphorus,
            Nutrient::Sodium => &mut self.sodium,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, &T)> + '_ {
        Nutrient::ALL.into_iter().map(move |n| (n, self.get(n)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Nutrient, &T) -> U) -> NutrientTable<U> {
        NutrientTable::from_fn(|n| f(n, self.get(n)))
    }
}

impl NutrientTable<NutrientAmount> {
    pub fn zeroed() -> Self {
        Self::from_fn(|n| n.amount(0.0))
    }

    pub fn values(&self) -> NutrientTable<f64> {
        self.map(|_, amount| amount.value())
    }
}

/// Daily limits derived from a [`Profile`].
pub type NutrientLimitSet = NutrientTable<NutrientAmount>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            other => Err(NutritionError::InvalidProfile(format!(
                "unrecognized activity level '{other}'"
            ))),
        }
    }
}

/// Patient inputs to limit calculation. Activity level is validated but
/// does not yet influence any limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub ckd_stage: u8,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.ckd_stage) {
            return Err(NutritionError::InvalidProfile(format!(
                "ckd stage must be between 1 and 5, got {}",
                self.ckd_stage
            )));
        }
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(NutritionError::InvalidProfile(format!(
                "weight must be a positive number of kg, got {}",
                self.weight_kg
            )));
        }
        Ok(())
    }
}

/// A logged meal as handed over by persistence. Nutrient slots are
/// optional so that a broken record reaches the aggregator and is
/// reported instead of being read as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodLogEntry {
    pub id: Uuid,
    pub food_name: String,
    pub portion_size: f64,
    pub portion_unit: String,
    pub nutrients: NutrientTable<Option<f64>>,
    pub confidence_score: f64,
    pub image_url: Option<String>,
    pub logged_at: OffsetDateTime,
}

impl FoodLogEntry {
    pub fn nutrient_value(&self, nutrient: Nutrient) -> Result<f64> {
        match *self.nutrients.get(nutrient) {
            Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(NutritionError::MalformedEntry {
                entry_id: self.id,
                nutrient,
            }),
        }
    }

    /// All four values, or the first missing one as an error.
    pub fn nutrient_values(&self) -> Result<NutrientTable<f64>> {
        NutrientTable::try_from_fn(|n| self.nutrient_value(n))
    }
}
