//! Serving estimation
//!
//! Picks the serving count whose per-serving macros sit closest to a meal's
//! targets. The penalty is a weighted sum of:
//! - absolute calorie distance
//! - sodium, saturated fat and added sugar above their ceilings
//! - fiber and protein below their floors
//!
//! Added sugar only counts when the batch reported it.

use super::{BatchTotals, MacroTotals};
use crate::settings::{NutritionPolicy, NutritionSettings, PenaltyWeights};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        MealType::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| format!("unknown meal '{}'", s))
    }
}

/// Per-meal targets derived from daily settings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealTargets {
    pub meal: MealType,
    pub meal_fraction: f64,
    pub kcal: f64,
    pub sodium_limit_mg: f64,
    pub sat_fat_limit_g: f64,
    pub added_sugar_limit_g: f64,
    pub fiber_target_g: f64,
    pub protein_floor_g: f64,
}

impl MealTargets {
    pub fn compute(settings: &NutritionSettings, policy: &NutritionPolicy, meal: MealType) -> Self {
        let fraction = settings.meal_fraction(meal);
        let daily_kcal = settings.daily_kcal;
        Self {
            meal,
            meal_fraction: fraction,
            kcal: daily_kcal * fraction,
            sodium_limit_mg: policy.sodium.daily_limit(daily_kcal) * fraction,
            sat_fat_limit_g: policy.sat_fat.daily_limit(daily_kcal) * fraction,
            added_sugar_limit_g: policy.added_sugar.daily_limit(daily_kcal) * fraction,
            fiber_target_g: daily_kcal / 1000.0 * policy.fiber_g_per_1000_kcal * fraction,
            protein_floor_g: settings.daily_protein_floor(policy) * fraction,
        }
    }

    /// Scale every target by `factor`; the meal fraction is unchanged
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            meal: self.meal,
            meal_fraction: self.meal_fraction,
            kcal: self.kcal * factor,
            sodium_limit_mg: self.sodium_limit_mg * factor,
            sat_fat_limit_g: self.sat_fat_limit_g * factor,
            added_sugar_limit_g: self.added_sugar_limit_g * factor,
            fiber_target_g: self.fiber_target_g * factor,
            protein_floor_g: self.protein_floor_g * factor,
        }
    }

    /// Weighted distance of one serving from these targets
    pub fn penalty(&self, serving: &MacroTotals, weights: &PenaltyWeights) -> f64 {
        let over = |value: f64, limit: f64| (value - limit).max(0.0);
        let mut penalty = weights.calories * (serving.kcal - self.kcal).abs()
            + weights.sodium * over(serving.sodium_mg, self.sodium_limit_mg)
            + weights.sat_fat * over(serving.sat_fat_g, self.sat_fat_limit_g)
            + weights.fiber * over(self.fiber_target_g, serving.fiber_g)
            + weights.protein * over(self.protein_floor_g, serving.protein_g);
        if let Some(added) = serving.added_sugar_g {
            penalty += weights.added_sugar * over(added, self.added_sugar_limit_g);
        }
        penalty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingEstimate {
    pub servings: u32,
    pub per_serving: MacroTotals,
    pub targets: MealTargets,
    pub penalty: f64,
}

/// Search `servings` ascending for the lowest penalty
///
/// Only a strictly lower penalty replaces the incumbent, so ties go to the
/// smaller serving count. An empty range yields `None`.
pub fn choose_servings(
    totals: &MacroTotals,
    targets: &MealTargets,
    weights: &PenaltyWeights,
    servings: std::ops::RangeInclusive<u32>,
) -> Option<ServingEstimate> {
    let mut best: Option<ServingEstimate> = None;
    for count in servings.filter(|n| *n > 0) {
        let per_serving = totals.per_serving(count);
        let penalty = targets.penalty(&per_serving, weights);
        if best.as_ref().map_or(true, |b| penalty < b.penalty) {
            best = Some(ServingEstimate {
                servings: count,
                per_serving,
                targets: targets.clone(),
                penalty,
            });
        }
    }
    best
}

/// Suggest a serving count for a complete batch; incomplete batches get `None`
pub fn estimate_servings(
    batch: &BatchTotals,
    settings: &NutritionSettings,
    meal: MealType,
    policy: &NutritionPolicy,
) -> Option<ServingEstimate> {
    if !batch.complete {
        return None;
    }
    let targets = MealTargets::compute(settings, policy, meal);
    choose_servings(
        &batch.totals,
        &targets,
        &policy.weights,
        policy.min_servings..=policy.max_servings,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::Coverage;

    fn batch(totals: MacroTotals) -> BatchTotals {
        BatchTotals {
            totals,
            missing: false,
            coverage: Coverage {
                covered: 1,
                total: 1,
            },
            complete: true,
            missing_tokens: vec![],
        }
    }

    #[test]
    fn test_dinner_targets() {
        let targets = MealTargets::compute(
            &NutritionSettings::default(),
            &NutritionPolicy::default(),
            MealType::Dinner,
        );
        assert!((targets.kcal - 700.0).abs() < 1e-6);
        assert!((targets.sodium_limit_mg - 805.0).abs() < 1e-6);
        assert!((targets.fiber_target_g - 9.8).abs() < 1e-6);
        assert!((targets.protein_floor_g - 17.5).abs() < 1e-6);
    }

    #[test]
    fn test_dinner_for_2400_kcal_batch() {
        let totals = MacroTotals {
            kcal: 2400.0,
            sodium_mg: 1800.0,
            sat_fat_g: 15.0,
            ..Default::default()
        };
        let estimate = estimate_servings(
            &batch(totals),
            &NutritionSettings::default(),
            MealType::Dinner,
            &NutritionPolicy::default(),
        )
        .unwrap();
        assert!((3..=4).contains(&estimate.servings));
        assert!((estimate.targets.kcal - 700.0).abs() < 1e-6);
    }

    #[test]
    fn test_exact_calorie_match_wins() {
        let totals = MacroTotals {
            kcal: 2100.0,
            sodium_mg: 1500.0,
            sat_fat_g: 12.0,
            fiber_g: 45.0,
            protein_g: 90.0,
            ..Default::default()
        };
        let estimate = estimate_servings(
            &batch(totals),
            &NutritionSettings::default(),
            MealType::Dinner,
            &NutritionPolicy::default(),
        )
        .unwrap();
        assert_eq!(estimate.servings, 3);
        assert!((estimate.per_serving.kcal - 700.0).abs() < 1e-9);
        assert!(estimate.penalty < 1e-6);
    }

    #[test]
    fn test_incomplete_batch_has_no_estimate() {
        let mut incomplete = batch(MacroTotals::default());
        incomplete.missing = true;
        incomplete.complete = false;
        assert!(estimate_servings(
            &incomplete,
            &NutritionSettings::default(),
            MealType::Lunch,
            &NutritionPolicy::default()
        )
        .is_none());
    }

    #[test]
    fn test_ties_go_to_fewer_servings() {
        let targets = MealTargets::compute(
            &NutritionSettings::default(),
            &NutritionPolicy::default(),
            MealType::Lunch,
        );
        let totals = MacroTotals {
            kcal: 1200.0,
            ..Default::default()
        };
        let flat = PenaltyWeights {
            calories: 0.0,
            sodium: 0.0,
            sat_fat: 0.0,
            fiber: 0.0,
            protein: 0.0,
            added_sugar: 0.0,
        };
        let estimate = choose_servings(&totals, &targets, &flat, 3..=6).unwrap();
        assert_eq!(estimate.servings, 3);
        assert!(choose_servings(&totals, &targets, &flat, 0..=0).is_none());
    }

    #[test]
    fn test_added_sugar_only_penalized_when_known() {
        let targets = MealTargets::compute(
            &NutritionSettings::default(),
            &NutritionPolicy::default(),
            MealType::Snack,
        );
        let weights = PenaltyWeights::default();
        let mut serving = MacroTotals {
            kcal: targets.kcal,
            fiber_g: targets.fiber_target_g,
            protein_g: targets.protein_floor_g,
            ..Default::default()
        };
        assert!(targets.penalty(&serving, &weights) < 1e-9);
        serving.added_sugar_g = Some(targets.added_sugar_limit_g + 2.0);
        assert!((targets.penalty(&serving, &weights) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_meal_parsing() {
        assert_eq!("Dinner".parse::<MealType>().unwrap(), MealType::Dinner);
        assert!("brunch".parse::<MealType>().is_err());
    }
}
