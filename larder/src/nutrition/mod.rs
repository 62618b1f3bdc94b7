//! Nutrition totals and serving estimation
//!
//! Totals sum per-serving macros across resolved options at the effective
//! multiplier. The estimator then searches serving counts for the one whose
//! per-serving macros best match a meal's targets.

pub mod estimator;
pub mod totals;

pub use estimator::{choose_servings, estimate_servings, MealTargets, MealType, ServingEstimate};
pub use totals::{compute_batch_totals, BatchTotals, Coverage};

use crate::recipe::NutritionVariant;
use serde::Serialize;

/// Macro sums; `added_sugar_g` stays unknown until some ingredient reports it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroTotals {
    pub kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub sat_fat_g: f64,
    pub carbs_g: f64,
    pub sugars_g: f64,
    pub fiber_g: f64,
    pub sodium_mg: f64,
    pub added_sugar_g: Option<f64>,
}

impl MacroTotals {
    /// Add `servings` servings of a usable variant
    pub fn add_variant(&mut self, variant: &NutritionVariant, servings: f64) {
        let part = |v: Option<f64>| v.unwrap_or(0.0) * servings;
        self.kcal += part(variant.kcal);
        self.protein_g += part(variant.protein_g);
        self.fat_g += part(variant.fat_g);
        self.sat_fat_g += part(variant.sat_fat_g);
        self.carbs_g += part(variant.carbs_g);
        self.sugars_g += part(variant.sugars_g);
        self.fiber_g += part(variant.fiber_g);
        self.sodium_mg += part(variant.sodium_mg);
        if let Some(added) = variant.added_sugar_g.filter(|v| v.is_finite()) {
            *self.added_sugar_g.get_or_insert(0.0) += added * servings;
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            kcal: self.kcal * factor,
            protein_g: self.protein_g * factor,
            fat_g: self.fat_g * factor,
            sat_fat_g: self.sat_fat_g * factor,
            carbs_g: self.carbs_g * factor,
            sugars_g: self.sugars_g * factor,
            fiber_g: self.fiber_g * factor,
            sodium_mg: self.sodium_mg * factor,
            added_sugar_g: self.added_sugar_g.map(|v| v * factor),
        }
    }

    /// Split the batch into `servings` equal portions
    pub fn per_serving(&self, servings: u32) -> Self {
        Self {
            kcal: self.kcal / servings as f64,
            protein_g: self.protein_g / servings as f64,
            fat_g: self.fat_g / servings as f64,
            sat_fat_g: self.sat_fat_g / servings as f64,
            carbs_g: self.carbs_g / servings as f64,
            sugars_g: self.sugars_g / servings as f64,
            fiber_g: self.fiber_g / servings as f64,
            sodium_mg: self.sodium_mg / servings as f64,
            added_sugar_g: self.added_sugar_g.map(|v| v / servings as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(kcal: f64, added_sugar_g: Option<f64>) -> NutritionVariant {
        NutritionVariant {
            kcal: Some(kcal),
            protein_g: Some(1.0),
            fat_g: Some(1.0),
            sat_fat_g: Some(0.5),
            carbs_g: Some(2.0),
            sugars_g: Some(1.0),
            fiber_g: Some(0.0),
            sodium_mg: Some(10.0),
            added_sugar_g,
            ..Default::default()
        }
    }

    #[test]
    fn test_added_sugar_unknown_until_reported() {
        let mut totals = MacroTotals::default();
        totals.add_variant(&variant(100.0, None), 2.0);
        assert_eq!(totals.kcal, 200.0);
        assert_eq!(totals.added_sugar_g, None);

        totals.add_variant(&variant(50.0, Some(3.0)), 1.0);
        assert_eq!(totals.added_sugar_g, Some(3.0));

        totals.add_variant(&variant(50.0, None), 1.0);
        assert_eq!(totals.added_sugar_g, Some(3.0));
        assert_eq!(totals.kcal, 300.0);
    }

    #[test]
    fn test_per_serving_divides_everything() {
        let mut totals = MacroTotals::default();
        totals.add_variant(&variant(400.0, Some(8.0)), 1.0);
        let each = totals.per_serving(4);
        assert_eq!(each.kcal, 100.0);
        assert_eq!(each.added_sugar_g, Some(2.0));
        assert_eq!(each.sodium_mg, 2.5);
    }
}
