//! Unit definitions and same-group conversion
//!
//! Units fall into three disjoint groups. Each group has a base unit and every
//! member carries a linear factor to that base:
//! - Volume (base: milliliter)
//! - Mass (base: gram)
//! - Count (base: each)

use super::aliases::normalize_unit;
use crate::{LarderError, LarderResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

static STANDARD: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::build_standard);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitGroup {
    Volume,
    Mass,
    Count,
}

/// A resolved unit definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDef {
    pub id: String,
    pub group: UnitGroup,
    pub label: String,
    pub plural: String,
    /// Multiply an amount in this unit by `to_base` to get the group's base unit
    pub to_base: f64,
}

impl UnitDef {
    /// Label for display next to an amount; fractions of one read singular
    pub fn label_for(&self, amount: f64) -> &str {
        if is_one(amount) || amount.abs() < 1.0 {
            &self.label
        } else {
            &self.plural
        }
    }
}

/// An amount expressed in a canonical unit id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedAmount {
    pub amount: f64,
    pub unit: String,
}

/// Serialized unit table: `{group: {baseUnit, units: {id: {label, plural, toBase}}}}`
pub type UnitTable = BTreeMap<UnitGroup, GroupSpec>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub base_unit: String,
    pub units: BTreeMap<String, UnitSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSpec {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub plural: Option<String>,
    pub to_base: f64,
}

/// Immutable lookup of unit definitions, built once
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<String, UnitDef>,
    bases: HashMap<UnitGroup, String>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::standard().clone()
    }
}

impl UnitRegistry {
    /// The built-in cooking unit table
    pub fn standard() -> &'static UnitRegistry {
        &STANDARD
    }

    /// Load a unit table from JSON
    pub fn from_json(json: &str, source_id: &str) -> LarderResult<Self> {
        let table: UnitTable =
            serde_json::from_str(json).map_err(|e| LarderError::parse(&e, source_id, json))?;
        Self::from_table(&table, source_id)
    }

    /// Build a registry from a deserialized table, checking group disjointness
    pub fn from_table(table: &UnitTable, source_id: &str) -> LarderResult<Self> {
        let mut units: HashMap<String, UnitDef> = HashMap::new();
        let mut bases = HashMap::new();
        let mut errors = Vec::new();

        for (group, spec) in table {
            let base = normalize_unit(&spec.base_unit);
            if !spec.units.keys().any(|id| normalize_unit(id) == base) {
                errors.push(LarderError::contract(
                    source_id,
                    format!("base unit '{}' of group {:?} is not defined", base, group),
                ));
            }
            bases.insert(*group, base);

            for (raw_id, unit) in &spec.units {
                let id = normalize_unit(raw_id);
                if !(unit.to_base.is_finite() && unit.to_base > 0.0) {
                    errors.push(LarderError::contract(
                        source_id,
                        format!("unit '{}' has non-positive toBase {}", id, unit.to_base),
                    ));
                    continue;
                }
                if let Some(existing) = units.get(&id) {
                    errors.push(LarderError::contract(
                        source_id,
                        format!(
                            "unit '{}' appears in both {:?} and {:?}",
                            id, existing.group, group
                        ),
                    ));
                    continue;
                }
                let label = unit.label.clone().unwrap_or_else(|| id.clone());
                let plural = unit.plural.clone().unwrap_or_else(|| label.clone());
                units.insert(
                    id.clone(),
                    UnitDef {
                        id,
                        group: *group,
                        label,
                        plural,
                        to_base: unit.to_base,
                    },
                );
            }
        }

        match LarderError::collect(errors) {
            Some(err) => Err(err),
            None => Ok(Self { units, bases }),
        }
    }

    /// Look up a unit by any alias
    pub fn lookup(&self, raw: &str) -> Option<&UnitDef> {
        self.units.get(&normalize_unit(raw))
    }

    pub fn group_of(&self, raw: &str) -> Option<UnitGroup> {
        self.lookup(raw).map(|def| def.group)
    }

    pub fn base_unit(&self, group: UnitGroup) -> Option<&str> {
        self.bases.get(&group).map(String::as_str)
    }

    /// Convert between two units of the same group
    ///
    /// Returns `None` when either unit is unknown or the units belong to
    /// different groups; cross-group conversion needs ingredient data.
    pub fn convert_unit_amount(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Option<ConvertedAmount> {
        let from_def = self.lookup(from)?;
        let to_def = self.lookup(to)?;
        if from_def.group != to_def.group || !amount.is_finite() {
            return None;
        }
        let converted = if from_def.id == to_def.id {
            amount
        } else {
            amount * from_def.to_base / to_def.to_base
        };
        Some(ConvertedAmount {
            amount: converted,
            unit: to_def.id.clone(),
        })
    }

    fn build_standard() -> Self {
        let volume: &[(&str, &str, &str, f64)] = &[
            ("ml", "ml", "ml", 1.0),
            ("l", "liter", "liters", 1000.0),
            ("tsp", "tsp", "tsp", 5.0),
            ("tbsp", "tbsp", "tbsp", 15.0),
            ("floz", "fl oz", "fl oz", 30.0),
            ("cup", "cup", "cups", 240.0),
            ("pint", "pint", "pints", 480.0),
            ("quart", "quart", "quarts", 960.0),
            ("gallon", "gallon", "gallons", 3840.0),
        ];
        let mass: &[(&str, &str, &str, f64)] = &[
            ("mg", "mg", "mg", 0.001),
            ("g", "g", "g", 1.0),
            ("kg", "kg", "kg", 1000.0),
            ("oz", "oz", "oz", 28.3495),
            ("lb", "lb", "lb", 453.592),
        ];
        let count: &[(&str, &str, &str, f64)] = &[
            ("each", "", "", 1.0),
            ("piece", "piece", "pieces", 1.0),
            ("whole", "whole", "whole", 1.0),
            ("clove", "clove", "cloves", 1.0),
            ("sprig", "sprig", "sprigs", 1.0),
            ("slice", "slice", "slices", 1.0),
            ("can", "can", "cans", 1.0),
            ("dozen", "dozen", "dozen", 12.0),
        ];

        let mut units = HashMap::new();
        let mut bases = HashMap::new();
        for (group, base, rows) in [
            (UnitGroup::Volume, "ml", volume),
            (UnitGroup::Mass, "g", mass),
            (UnitGroup::Count, "each", count),
        ] {
            bases.insert(group, base.to_string());
            for (id, label, plural, to_base) in rows {
                units.insert(
                    id.to_string(),
                    UnitDef {
                        id: id.to_string(),
                        group,
                        label: label.to_string(),
                        plural: plural.to_string(),
                        to_base: *to_base,
                    },
                );
            }
        }
        Self { units, bases }
    }
}

/// True when an amount reads as exactly one
pub(crate) fn is_one(amount: f64) -> bool {
    (amount - 1.0).abs() < 1e-9
}
