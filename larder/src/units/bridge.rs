//! Cross-group conversion using ingredient-specific factors
//!
//! A clove of garlic has a weight and a cup of flour has a weight, but
//! neither follows from the unit alone. Bridging takes a single hop through
//! grams (or teaspoons, for sprigs) using factors supplied per ingredient.

use super::aliases::normalize_unit;
use super::registry::{ConvertedAmount, UnitGroup, UnitRegistry};
use crate::{LarderError, LarderResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A generic `{fromUnit, toUnit, factor}` row: 1 `from_unit` = `factor` `to_unit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionFactor {
    pub from_unit: String,
    pub to_unit: String,
    pub factor: f64,
}

/// Bridging factors for one ingredient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientConversions {
    #[serde(default)]
    pub grams_per_count: Option<f64>,
    #[serde(default)]
    pub tsp_per_sprig: Option<f64>,
    #[serde(default)]
    pub grams_per_cup: Option<f64>,
    #[serde(default)]
    pub factors: Vec<ConversionFactor>,
}

/// Bridging factors keyed by ingredient id
pub type ConversionTable = HashMap<String, IngredientConversions>;

fn usable(factor: Option<f64>) -> Option<f64> {
    factor.filter(|f| f.is_finite() && *f > 0.0)
}

/// Unit registry plus the per-ingredient bridging data
#[derive(Debug, Clone, Default)]
pub struct Converter {
    registry: UnitRegistry,
    conversions: ConversionTable,
}

impl Converter {
    pub fn new(registry: UnitRegistry, conversions: ConversionTable) -> Self {
        Self {
            registry,
            conversions,
        }
    }

    /// Standard units with no ingredient data
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn with_conversions(mut self, conversions: ConversionTable) -> Self {
        self.conversions = conversions;
        self
    }

    /// Load a conversion table from JSON and add it to this converter
    pub fn load_conversions_json(&mut self, json: &str, source_id: &str) -> LarderResult<usize> {
        let table: ConversionTable =
            serde_json::from_str(json).map_err(|e| LarderError::parse(&e, source_id, json))?;
        let count = table.len();
        self.conversions.extend(table);
        Ok(count)
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn conversions_for(&self, ingredient_id: &str) -> Option<&IngredientConversions> {
        self.conversions.get(ingredient_id)
    }

    /// Same-group conversion only
    pub fn convert_unit_amount(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Option<ConvertedAmount> {
        self.registry.convert_unit_amount(amount, from, to)
    }

    /// Convert with ingredient bridging as a fallback
    ///
    /// Tries a direct same-group conversion first, then the ingredient's
    /// generic factor rows, then the gram/teaspoon bridges. Missing or
    /// unusable factors fail the conversion; no default factor is assumed.
    pub fn convert_for_ingredient(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        ingredient_id: &str,
    ) -> Option<ConvertedAmount> {
        if let Some(direct) = self.convert_unit_amount(amount, from, to) {
            return Some(direct);
        }
        let conversions = self.conversions_for(ingredient_id)?;
        self.via_factor_rows(amount, from, to, conversions)
            .or_else(|| self.via_bridges(amount, from, to, conversions))
    }

    fn via_factor_rows(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        conversions: &IngredientConversions,
    ) -> Option<ConvertedAmount> {
        conversions.factors.iter().find_map(|row| {
            let factor = usable(Some(row.factor))?;
            let forward = || {
                let start = self.restate(amount, from, &row.from_unit)?;
                self.restate(start.amount * factor, &row.to_unit, to)
            };
            let reverse = || {
                let start = self.restate(amount, from, &row.to_unit)?;
                self.restate(start.amount / factor, &row.from_unit, to)
            };
            forward().or_else(reverse)
        })
    }

    /// Same-group conversion that also accepts a unit the registry lacks,
    /// as long as both sides name that same unit
    fn restate(&self, amount: f64, from: &str, to: &str) -> Option<ConvertedAmount> {
        let unit = normalize_unit(to);
        if amount.is_finite() && normalize_unit(from) == unit {
            return Some(ConvertedAmount { amount, unit });
        }
        self.convert_unit_amount(amount, from, to)
    }

    fn via_bridges(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        conversions: &IngredientConversions,
    ) -> Option<ConvertedAmount> {
        let from_group = self.registry.group_of(from)?;
        let to_group = self.registry.group_of(to)?;
        let count_base = self.registry.base_unit(UnitGroup::Count)?;

        match (from_group, to_group) {
            (UnitGroup::Count, UnitGroup::Mass) => {
                let per_count = usable(conversions.grams_per_count)?;
                let count = self.convert_unit_amount(amount, from, count_base)?;
                self.convert_unit_amount(count.amount * per_count, "g", to)
            }
            (UnitGroup::Mass, UnitGroup::Count) => {
                let per_count = usable(conversions.grams_per_count)?;
                let grams = self.convert_unit_amount(amount, from, "g")?;
                self.convert_unit_amount(grams.amount / per_count, count_base, to)
            }
            (UnitGroup::Volume, UnitGroup::Mass) => {
                let per_cup = usable(conversions.grams_per_cup)?;
                let cups = self.convert_unit_amount(amount, from, "cup")?;
                self.convert_unit_amount(cups.amount * per_cup, "g", to)
            }
            (UnitGroup::Mass, UnitGroup::Volume) => {
                let per_cup = usable(conversions.grams_per_cup)?;
                let grams = self.convert_unit_amount(amount, from, "g")?;
                self.convert_unit_amount(grams.amount / per_cup, "cup", to)
            }
            (UnitGroup::Count, UnitGroup::Volume) => {
                let per_sprig = usable(conversions.tsp_per_sprig)?;
                let count = self.convert_unit_amount(amount, from, count_base)?;
                self.convert_unit_amount(count.amount * per_sprig, "tsp", to)
            }
            (UnitGroup::Volume, UnitGroup::Count) => {
                let per_sprig = usable(conversions.tsp_per_sprig)?;
                let tsp = self.convert_unit_amount(amount, from, "tsp")?;
                self.convert_unit_amount(tsp.amount / per_sprig, count_base, to)
            }
            _ => None,
        }
    }
}
