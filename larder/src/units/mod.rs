//! Unit registry and conversion
//!
//! Conversion runs in two tiers:
//! 1. Same-group conversion through the group's base unit (`registry`)
//! 2. Ingredient-specific bridging between groups (`bridge`)

pub mod aliases;
pub mod bridge;
pub mod registry;

pub use aliases::normalize_unit;
pub use bridge::{ConversionFactor, ConversionTable, Converter, IngredientConversions};
pub use registry::{
    ConvertedAmount, GroupSpec, UnitDef, UnitGroup, UnitRegistry, UnitSpec, UnitTable,
};

/// Convert between two units of the same group using the standard table
pub fn convert_unit_amount(amount: f64, from: &str, to: &str) -> Option<ConvertedAmount> {
    UnitRegistry::standard().convert_unit_amount(amount, from, to)
}
