use crate::nutrition::MealType;
use crate::{LarderError, LarderResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Energy density of protein and carbohydrate
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_SUGAR: f64 = 4.0;
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// A daily upper bound on one nutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Ceiling {
    /// Share of daily energy, converted to grams
    #[serde(rename_all = "camelCase")]
    PercentOfKcal { percent: f64, kcal_per_gram: f64 },
    /// Fixed daily amount in the nutrient's own unit
    Daily { amount: f64 },
}

impl Ceiling {
    pub fn daily_limit(&self, daily_kcal: f64) -> f64 {
        match *self {
            Ceiling::PercentOfKcal {
                percent,
                kcal_per_gram,
            } if kcal_per_gram > 0.0 => daily_kcal * percent / 100.0 / kcal_per_gram,
            Ceiling::PercentOfKcal { .. } => 0.0,
            Ceiling::Daily { amount } => amount,
        }
    }
}

/// Who is eating: daily energy and how it splits across meals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NutritionSettings {
    pub daily_kcal: f64,

    /// Enables the per-kilogram protein floor
    pub body_weight_kg: Option<f64>,

    /// Share of the day per meal; re-normalized before use
    pub meal_fractions: BTreeMap<MealType, f64>,
}

impl Default for NutritionSettings {
    fn default() -> Self {
        Self {
            daily_kcal: 2000.0,
            body_weight_kg: None,
            meal_fractions: BTreeMap::from([
                (MealType::Breakfast, 0.25),
                (MealType::Lunch, 0.35),
                (MealType::Dinner, 0.35),
                (MealType::Snack, 0.05),
            ]),
        }
    }
}

impl NutritionSettings {
    /// The meal's share of the day after normalizing all fractions to sum to 1
    ///
    /// Negative entries count as zero. When nothing positive remains the day
    /// splits evenly across every meal type.
    pub fn meal_fraction(&self, meal: MealType) -> f64 {
        let clamp = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let sum: f64 = self.meal_fractions.values().copied().map(clamp).sum();
        if sum <= 0.0 {
            return 1.0 / MealType::ALL.len() as f64;
        }
        self.meal_fractions.get(&meal).copied().map(clamp).unwrap_or(0.0) / sum
    }

    fn body_weight(&self) -> Option<f64> {
        self.body_weight_kg.filter(|w| w.is_finite() && *w > 0.0)
    }

    /// Daily protein floor in grams
    pub fn daily_protein_floor(&self, policy: &NutritionPolicy) -> f64 {
        match self.body_weight() {
            Some(kg) => kg * policy.protein_g_per_kg,
            None => {
                self.daily_kcal * policy.protein_fallback_percent_kcal
                    / 100.0
                    / KCAL_PER_GRAM_PROTEIN
            }
        }
    }
}

/// Weights applied to each penalty term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PenaltyWeights {
    pub calories: f64,
    pub sodium: f64,
    pub sat_fat: f64,
    pub fiber: f64,
    pub protein: f64,
    pub added_sugar: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            calories: 1.0,
            sodium: 0.1,
            sat_fat: 10.0,
            fiber: 5.0,
            protein: 5.0,
            added_sugar: 5.0,
        }
    }
}

/// Dietary guideline constants the serving estimator scores against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NutritionPolicy {
    /// mg per day
    pub sodium: Ceiling,
    pub sat_fat: Ceiling,
    pub added_sugar: Ceiling,

    /// Fiber floor, grams per 1000 kcal
    pub fiber_g_per_1000_kcal: f64,

    pub protein_g_per_kg: f64,

    /// Protein floor as a share of kcal when body weight is unknown
    pub protein_fallback_percent_kcal: f64,

    pub weights: PenaltyWeights,

    /// Inclusive range of serving counts the estimator considers
    pub min_servings: u32,
    pub max_servings: u32,
}

impl Default for NutritionPolicy {
    fn default() -> Self {
        Self {
            sodium: Ceiling::Daily { amount: 2300.0 },
            sat_fat: Ceiling::PercentOfKcal {
                percent: 10.0,
                kcal_per_gram: KCAL_PER_GRAM_FAT,
            },
            added_sugar: Ceiling::PercentOfKcal {
                percent: 10.0,
                kcal_per_gram: KCAL_PER_GRAM_SUGAR,
            },
            fiber_g_per_1000_kcal: 14.0,
            protein_g_per_kg: 0.8,
            protein_fallback_percent_kcal: 10.0,
            weights: PenaltyWeights::default(),
            min_servings: 1,
            max_servings: 20,
        }
    }
}

/// Engine-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub settings: NutritionSettings,
    pub policy: NutritionPolicy,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON; missing fields keep their defaults
    pub fn from_json(json: &str, source_id: &str) -> LarderResult<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| LarderError::parse(&e, source_id, json))?;
        let policy = &config.policy;
        if policy.min_servings == 0 || policy.min_servings > policy.max_servings {
            return Err(LarderError::contract(
                source_id,
                format!(
                    "serving range {}..={} is empty or starts at zero",
                    policy.min_servings, policy.max_servings
                ),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_meal_fractions_normalize() {
        let settings = NutritionSettings::default();
        assert!((settings.meal_fraction(MealType::Dinner) - 0.35).abs() < 1e-9);
        let total: f64 = MealType::ALL.iter().map(|m| settings.meal_fraction(*m)).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_fractions_split_evenly() {
        let settings = NutritionSettings {
            meal_fractions: BTreeMap::from([(MealType::Lunch, 0.0), (MealType::Dinner, -1.0)]),
            ..Default::default()
        };
        assert_eq!(settings.meal_fraction(MealType::Snack), 0.25);
    }

    #[test]
    fn test_unnormalized_fractions() {
        let settings = NutritionSettings {
            meal_fractions: BTreeMap::from([(MealType::Lunch, 1.0), (MealType::Dinner, 3.0)]),
            ..Default::default()
        };
        assert_eq!(settings.meal_fraction(MealType::Dinner), 0.75);
        assert_eq!(settings.meal_fraction(MealType::Breakfast), 0.0);
    }

    #[test]
    fn test_ceilings() {
        let policy = NutritionPolicy::default();
        assert_eq!(policy.sodium.daily_limit(2000.0), 2300.0);
        assert!((policy.sat_fat.daily_limit(1800.0) - 20.0).abs() < 1e-9);
        assert!((policy.added_sugar.daily_limit(2000.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_protein_floor_prefers_body_weight() {
        let policy = NutritionPolicy::default();
        let mut settings = NutritionSettings::default();
        assert!((settings.daily_protein_floor(&policy) - 50.0).abs() < 1e-9);
        settings.body_weight_kg = Some(70.0);
        assert!((settings.daily_protein_floor(&policy) - 56.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_config_json() {
        let config = EngineConfig::from_json(
            r#"{"settings": {"dailyKcal": 2500}, "policy": {"sodium": {"kind": "daily", "amount": 1500}}}"#,
            "config.json",
        )
        .unwrap();
        assert_eq!(config.settings.daily_kcal, 2500.0);
        assert_eq!(config.settings.meal_fractions.len(), 4);
        assert_eq!(config.policy.sodium, Ceiling::Daily { amount: 1500.0 });
        assert_eq!(config.policy.max_servings, 20);
    }

    #[test]
    fn test_empty_serving_range_rejected() {
        let result = EngineConfig::from_json(r#"{"policy": {"minServings": 0}}"#, "config.json");
        assert!(matches!(result, Err(LarderError::Contract { .. })));
    }
}
