//! Dietary compatibility analysis
//!
//! Each restriction exposes one of three states to the toggle UI:
//! - `Cannot`: no combination of choices satisfies it
//! - `Ready`: the default recipe already complies (`locked` when no
//!   alternative could break compliance)
//! - `CanBecome`: compliance requires turning the toggle on

use crate::recipe::{IngredientOption, Recipe, Restriction, Restrictions, TokenData};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RestrictionStatus {
    Cannot,
    Ready { locked: bool },
    CanBecome,
}

/// The option a token resolves to with no swaps and no toggles
pub fn resolve_default<'r>(recipe: &Recipe, data: &'r TokenData) -> Option<&'r IngredientOption> {
    if data.is_choice {
        if let Some(option) = recipe
            .default_option_key(&data.token)
            .and_then(|key| data.member(key))
        {
            return Some(option);
        }
        if let Some(first_member) = data.choice_members().next() {
            return Some(first_member);
        }
    }
    data.options.first()
}

/// For each restriction: does every token's default option meet it?
pub fn recipe_default_compatibility(recipe: &Recipe) -> Restrictions {
    let mut compatibility = Restrictions::default();
    for restriction in Restriction::ALL {
        let met = recipe
            .ingredients
            .values()
            .filter_map(|data| resolve_default(recipe, data))
            .all(|option| option.meets(restriction));
        compatibility.set(restriction, met);
    }
    compatibility
}

/// Does some choice token offer a member that fails the restriction?
pub fn has_non_compliant_alternative(recipe: &Recipe, restriction: Restriction) -> bool {
    recipe
        .ingredients
        .values()
        .filter(|data| data.is_choice)
        .any(|data| data.choice_members().any(|o| !o.meets(restriction)))
}

pub fn restriction_status(recipe: &Recipe, restriction: Restriction) -> RestrictionStatus {
    if !recipe.compatibility_possible().get(restriction) {
        return RestrictionStatus::Cannot;
    }
    if recipe_default_compatibility(recipe).get(restriction) {
        RestrictionStatus::Ready {
            locked: !has_non_compliant_alternative(recipe, restriction),
        }
    } else {
        RestrictionStatus::CanBecome
    }
}

pub fn restriction_statuses(recipe: &Recipe) -> Vec<(Restriction, RestrictionStatus)> {
    Restriction::ALL
        .into_iter()
        .map(|r| (r, restriction_status(recipe, r)))
        .collect()
}

/// Members other than `chosen` that satisfy every active restriction
pub fn compatible_alternatives<'r>(
    data: &'r TokenData,
    chosen: &IngredientOption,
    restrictions: &Restrictions,
) -> Vec<&'r IngredientOption> {
    if !data.is_choice {
        return Vec::new();
    }
    data.choice_members()
        .filter(|o| o.option_key != chosen.option_key && o.meets_all(restrictions))
        .collect()
}
