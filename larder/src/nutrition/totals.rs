use super::MacroTotals;
use crate::fraction::{multiply_fraction, parse_ratio};
use crate::recipe::{IngredientOption, NutritionVariant, Recipe};
use crate::resolver::resolve_all;
use crate::state::RenderState;
use crate::units::{normalize_unit, Converter};
use crate::LarderResult;
use serde::Serialize;
use tracing::debug;

/// How many attempted ingredients contributed nutrition data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub covered: usize,
    pub total: usize,
}

impl Coverage {
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| self.covered as f64 / self.total as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTotals {
    pub totals: MacroTotals,
    /// Some attempted ingredient could not contribute
    pub missing: bool,
    pub coverage: Coverage,
    /// No gaps and at least one ingredient attempted
    pub complete: bool,
    /// Tokens that were attempted but contributed nothing
    pub missing_tokens: Vec<String>,
}

/// Amount of `option` expressed in the variant's serving unit
fn amount_in_serving_unit(
    converter: &Converter,
    amount: f64,
    option: &IngredientOption,
    variant: &NutritionVariant,
    alternate_unit: Option<&str>,
) -> Option<f64> {
    // A null serving unit means servings are counted in the option's own unit
    let serving_unit = variant.serving_unit.as_deref().unwrap_or(&option.unit);
    if normalize_unit(serving_unit) == normalize_unit(&option.unit) {
        return Some(amount);
    }
    let id = option.ingredient_id.as_str();
    let direct = converter.convert_for_ingredient(amount, &option.unit, serving_unit, id);
    if let Some(converted) = direct {
        return Some(converted.amount);
    }
    let alternate = alternate_unit?;
    let pinned = converter.convert_for_ingredient(amount, &option.unit, alternate, id)?;
    converter
        .convert_for_ingredient(pinned.amount, &pinned.unit, serving_unit, id)
        .map(|c| c.amount)
}

/// Number of variant servings in `amount`, from the first variant that both
/// converts and carries every required macro
fn servings_of<'o>(
    converter: &Converter,
    amount: f64,
    option: &'o IngredientOption,
    alternate_unit: Option<&str>,
) -> Option<(&'o NutritionVariant, f64)> {
    option.nutrition.iter().find_map(|variant| {
        if !variant.is_usable() {
            return None;
        }
        let in_serving_unit =
            amount_in_serving_unit(converter, amount, option, variant, alternate_unit)?;
        Some((variant, in_serving_unit / variant.serving_qty()))
    })
}

/// Sum nutrition across visible resolved options at the effective multiplier
///
/// Options without a ratio or unit are skipped and do not count toward
/// coverage. Every other option counts once; one that cannot be converted
/// or lacks usable data flips `missing` but does not stop accumulation.
pub fn compute_batch_totals(
    recipe: &Recipe,
    state: &mut RenderState,
    converter: &Converter,
) -> LarderResult<BatchTotals> {
    let resolved = resolve_all(recipe, state)?;
    let multiplier = state.effective_multiplier();
    let mut batch = BatchTotals::default();

    for entry in resolved.iter().filter(|r| r.visible) {
        let option = entry.option;
        if option.ratio.trim().is_empty() || option.unit.trim().is_empty() {
            continue;
        }
        batch.coverage.total += 1;

        let contribution = parse_ratio(&option.ratio).and_then(|ratio| {
            let amount = multiply_fraction(ratio, multiplier).to_f64();
            let alternate = state.unit_selections.get(entry.token).map(String::as_str);
            servings_of(converter, amount, option, alternate)
        });

        match contribution {
            Some((variant, servings)) => {
                batch.totals.add_variant(variant, servings);
                batch.coverage.covered += 1;
            }
            None => {
                debug!(
                    recipe = recipe.id.as_str(),
                    token = entry.token,
                    ingredient = option.ingredient_id.as_str(),
                    "no usable nutrition for ingredient"
                );
                batch.missing = true;
                batch.missing_tokens.push(entry.token.to_string());
            }
        }
    }

    batch.complete = !batch.missing && batch.coverage.total > 0;
    Ok(batch)
}
