//! Option resolution
//!
//! Picks the single active option for every token:
//! 1. Non-choice tokens resolve to their only option
//! 2. Choice tokens honor the user's swap, then the recipe default, then
//!    the first option compatible with the active restrictions
//! 3. Active restrictions override a non-compliant pick whenever some
//!    member complies
//!
//! Dependent entries are filtered afterwards in a separate pass, once every
//! controlling token has been resolved.

pub mod compatibility;

pub use compatibility::{
    compatible_alternatives, has_non_compliant_alternative, recipe_default_compatibility,
    resolve_default, restriction_status, restriction_statuses, RestrictionStatus,
};

use crate::recipe::{DependsOn, IngredientOption, Recipe, TokenData};
use crate::state::RenderState;
use crate::{LarderError, LarderResult};
use std::collections::HashMap;
use tracing::{debug, warn};

fn first_option<'r>(recipe: &Recipe, data: &'r TokenData) -> LarderResult<&'r IngredientOption> {
    data.options.first().ok_or_else(|| {
        LarderError::contract(
            recipe.id.as_str(),
            format!("token '{}' has no options", data.token),
        )
    })
}

/// Resolve a token without touching the state
pub fn resolve_option<'r>(
    token: &str,
    recipe: &'r Recipe,
    state: &RenderState,
) -> LarderResult<&'r IngredientOption> {
    let data = recipe.token(token)?;
    let first = first_option(recipe, data)?;
    if !data.is_choice {
        return Ok(first);
    }

    let members: Vec<&IngredientOption> = data.choice_members().collect();
    let Some(&first_member) = members.first() else {
        return Ok(first);
    };

    let restrictions = &state.restrictions;
    let selected = state
        .selected_options
        .get(token)
        .and_then(|key| data.member(key));
    let default = recipe
        .default_option_key(token)
        .and_then(|key| data.member(key));
    let first_compatible = members.iter().copied().find(|o| o.meets_all(restrictions));

    let chosen = selected
        .or(default)
        .or(first_compatible)
        .unwrap_or(first_member);

    if !restrictions.any_active() || chosen.meets_all(restrictions) {
        return Ok(chosen);
    }
    let Some(compliant) = first_compatible else {
        // Nothing complies; keep the pick rather than invent one
        return Ok(chosen);
    };

    let replacement = selected
        .filter(|o| o.meets_all(restrictions))
        .or_else(|| default.filter(|o| o.meets_all(restrictions)))
        .unwrap_or(compliant);
    debug!(
        token,
        from = chosen.option_key.as_str(),
        to = replacement.option_key.as_str(),
        "restriction override"
    );
    Ok(replacement)
}

/// Resolve a token and cache the chosen key in `state.selected_options`
///
/// Later calls in the same pass see the already-resolved choice.
pub fn select_option_for_token<'r>(
    token: &str,
    recipe: &'r Recipe,
    state: &mut RenderState,
) -> LarderResult<&'r IngredientOption> {
    let option = resolve_option(token, recipe, state)?;
    if option.is_choice_member() {
        state
            .selected_options
            .insert(token.to_string(), option.option_key.clone());
    }
    Ok(option)
}

/// One token after resolution and visibility filtering
#[derive(Debug, Clone)]
pub struct ResolvedToken<'r> {
    pub token: &'r str,
    pub data: &'r TokenData,
    pub option: &'r IngredientOption,
    pub visible: bool,
}

/// Resolve every token in declared order, then filter dependents
///
/// Phase one resolves all tokens (caching choices into `state`). Phase two
/// evaluates `dependsOn` against the phase-one results, so a controller is
/// always resolved before any dependent looks at it.
pub fn resolve_all<'r>(
    recipe: &'r Recipe,
    state: &mut RenderState,
) -> LarderResult<Vec<ResolvedToken<'r>>> {
    let mut resolved = Vec::with_capacity(recipe.token_order.len());
    for token in &recipe.token_order {
        let data = recipe.token(token)?;
        let option = select_option_for_token(token, recipe, state)?;
        resolved.push(ResolvedToken {
            token: token.as_str(),
            data,
            option,
            visible: true,
        });
    }

    let by_token: HashMap<&str, &IngredientOption> =
        resolved.iter().map(|r| (r.token, r.option)).collect();

    let mut visibility = Vec::with_capacity(resolved.len());
    for entry in &resolved {
        let visible = match entry.data.depends_on_for(entry.option) {
            Some(dep) => dependency_met(recipe, entry.token, dep, &by_token)?,
            None => true,
        };
        if !visible {
            debug!(token = entry.token, controller = dep_token(entry), "dependent dropped");
        }
        visibility.push(visible);
    }
    for (entry, visible) in resolved.iter_mut().zip(visibility) {
        entry.visible = visible;
    }
    Ok(resolved)
}

fn dep_token<'a>(entry: &'a ResolvedToken<'_>) -> &'a str {
    entry
        .data
        .depends_on_for(entry.option)
        .map(|d| d.token.as_str())
        .unwrap_or_default()
}

/// Whether a dependent's condition holds against resolved controllers
pub fn dependency_met(
    recipe: &Recipe,
    token: &str,
    dep: &DependsOn,
    resolved: &HashMap<&str, &IngredientOption>,
) -> LarderResult<bool> {
    let Some(controller) = resolved.get(dep.token.as_str()) else {
        return Err(LarderError::UnknownDependency {
            recipe: recipe.id.clone(),
            token: token.to_string(),
            depends_on: dep.token.clone(),
        });
    };

    if let Some(controller_data) = recipe.ingredients.get(&dep.token) {
        if controller_data.depends_on_for(controller).is_some() {
            warn!(
                recipe = recipe.id.as_str(),
                token,
                controller = dep.token.as_str(),
                "nested dependency; only the direct controller is checked"
            );
        }
    }

    Ok(match &dep.option {
        Some(key) => &controller.option_key == key,
        None => true,
    })
}
