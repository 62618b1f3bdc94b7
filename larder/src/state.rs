//! Per-session render state
//!
//! Owned by the caller, one per open recipe view. Carries the batch size,
//! the user's explicit swaps and dietary toggles, and the resolver's cache of
//! already-resolved choices.

use crate::pan::{pan_multiplier, PanSize};
use crate::recipe::{Recipe, Restriction, Restrictions};
use crate::resolver::recipe_default_compatibility;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn unit_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    /// Batch multiplier
    pub multiplier: f64,
    /// Secondary multiplier from pan-size scaling
    #[serde(default = "unit_multiplier")]
    pub pan_multiplier: f64,
    /// token -> option key; user overrides, also written back by the resolver
    #[serde(default)]
    pub selected_options: HashMap<String, String>,
    #[serde(default)]
    pub restrictions: Restrictions,
    /// token -> preferred display unit
    #[serde(default)]
    pub unit_selections: HashMap<String, String>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            pan_multiplier: 1.0,
            selected_options: HashMap::new(),
            restrictions: Restrictions::default(),
            unit_selections: HashMap::new(),
        }
    }
}

impl RenderState {
    /// Fresh session state: base multiplier, no overrides, and every
    /// restriction the default recipe already satisfies switched on
    pub fn for_recipe(recipe: &Recipe) -> Self {
        Self::with_restrictions(recipe, recipe_default_compatibility(recipe))
    }

    pub fn with_restrictions(recipe: &Recipe, restrictions: Restrictions) -> Self {
        Self {
            multiplier: recipe.default_base,
            restrictions,
            ..Self::default()
        }
    }

    /// The single scalar applied to every quantity
    pub fn effective_multiplier(&self) -> f64 {
        self.multiplier * self.pan_multiplier
    }

    /// Scale for a pan change; an undefined ratio resets to 1
    pub fn set_pan(&mut self, from: PanSize, to: PanSize) -> bool {
        match pan_multiplier(from, to) {
            Some(ratio) => {
                self.pan_multiplier = ratio;
                true
            }
            None => {
                self.pan_multiplier = 1.0;
                false
            }
        }
    }

    /// Record an explicit user swap
    pub fn select(&mut self, token: impl Into<String>, option_key: impl Into<String>) {
        self.selected_options.insert(token.into(), option_key.into());
    }

    pub fn set_restriction(&mut self, restriction: Restriction, enabled: bool) {
        self.restrictions.set(restriction, enabled);
    }

    pub fn prefer_unit(&mut self, token: impl Into<String>, unit: impl Into<String>) {
        self.unit_selections.insert(token.into(), unit.into());
    }
}
