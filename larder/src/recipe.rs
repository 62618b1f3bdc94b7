//! Normalized recipe documents
//!
//! These types mirror the JSON produced by the recipe build step. A `Recipe`
//! is read-only once loaded and may be shared by any number of sessions.

use crate::{LarderError, LarderResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A dietary restriction the user can toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Restriction {
    GlutenFree,
    EggFree,
    DairyFree,
}

impl Restriction {
    pub const ALL: [Restriction; 3] = [
        Restriction::GlutenFree,
        Restriction::EggFree,
        Restriction::DairyFree,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Restriction::GlutenFree => "gluten-free",
            Restriction::EggFree => "egg-free",
            Restriction::DairyFree => "dairy-free",
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Restriction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "glutenfree" | "gf" => Ok(Restriction::GlutenFree),
            "eggfree" | "ef" => Ok(Restriction::EggFree),
            "dairyfree" | "df" => Ok(Restriction::DairyFree),
            _ => Err(format!(
                "Unknown restriction '{}'. Expected one of: gluten-free, egg-free, dairy-free",
                s
            )),
        }
    }
}

/// One boolean per restriction
///
/// Used both for the user's active toggles and for recipe-level
/// "is this achievable" flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restrictions {
    #[serde(default)]
    pub gluten_free: bool,
    #[serde(default)]
    pub egg_free: bool,
    #[serde(default)]
    pub dairy_free: bool,
}

impl Restrictions {
    pub fn get(&self, restriction: Restriction) -> bool {
        match restriction {
            Restriction::GlutenFree => self.gluten_free,
            Restriction::EggFree => self.egg_free,
            Restriction::DairyFree => self.dairy_free,
        }
    }

    pub fn set(&mut self, restriction: Restriction, enabled: bool) {
        match restriction {
            Restriction::GlutenFree => self.gluten_free = enabled,
            Restriction::EggFree => self.egg_free = enabled,
            Restriction::DairyFree => self.dairy_free = enabled,
        }
    }

    pub fn active(&self) -> impl Iterator<Item = Restriction> + '_ {
        Restriction::ALL.into_iter().filter(move |r| self.get(*r))
    }

    pub fn any_active(&self) -> bool {
        self.active().next().is_some()
    }
}

/// Per-option dietary flags; an absent flag counts as compliant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dietary {
    #[serde(default)]
    pub gluten_free: Option<bool>,
    #[serde(default)]
    pub egg_free: Option<bool>,
    #[serde(default)]
    pub dairy_free: Option<bool>,
}

impl Dietary {
    pub fn flag(&self, restriction: Restriction) -> Option<bool> {
        match restriction {
            Restriction::GlutenFree => self.gluten_free,
            Restriction::EggFree => self.egg_free,
            Restriction::DairyFree => self.dairy_free,
        }
    }
}

/// Visibility condition: shown only when `token` resolves to `option`
/// (or to anything at all when `option` is absent)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependsOn {
    pub token: String,
    #[serde(default)]
    pub option: Option<String>,
}

/// Nutrition facts for one serving of an ingredient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionVariant {
    #[serde(default)]
    pub serving_qty: Option<f64>,
    #[serde(default)]
    pub serving_unit: Option<String>,
    #[serde(default)]
    pub kcal: Option<f64>,
    #[serde(default)]
    pub protein_g: Option<f64>,
    #[serde(default)]
    pub fat_g: Option<f64>,
    #[serde(default)]
    pub sat_fat_g: Option<f64>,
    #[serde(default)]
    pub carbs_g: Option<f64>,
    #[serde(default)]
    pub sugars_g: Option<f64>,
    #[serde(default)]
    pub fiber_g: Option<f64>,
    #[serde(default)]
    pub sodium_mg: Option<f64>,
    #[serde(default)]
    pub added_sugar_g: Option<f64>,
}

impl NutritionVariant {
    /// Serving size, falling back to 1 for missing or non-positive values
    pub fn serving_qty(&self) -> f64 {
        self.serving_qty
            .filter(|q| q.is_finite() && *q > 0.0)
            .unwrap_or(1.0)
    }

    /// True when every required macro is a finite number
    pub fn is_usable(&self) -> bool {
        [
            self.kcal,
            self.protein_g,
            self.fat_g,
            self.sat_fat_g,
            self.carbs_g,
            self.sugars_g,
            self.fiber_g,
            self.sodium_mg,
        ]
        .iter()
        .all(|v| v.is_some_and(f64::is_finite))
    }
}

/// One selectable variant of an ingredient token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientOption {
    /// Empty for the sole variant of a non-choice token
    #[serde(default)]
    pub option_key: String,
    pub display: String,
    #[serde(default)]
    pub ratio: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub ingredient_id: String,
    #[serde(default)]
    pub dietary: Option<Dietary>,
    #[serde(default)]
    pub depends_on: Option<DependsOn>,
    #[serde(default)]
    pub line_group: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub nutrition: Vec<NutritionVariant>,
}

impl IngredientOption {
    /// An option meets a restriction when its flag is true or absent
    pub fn meets(&self, restriction: Restriction) -> bool {
        self.dietary
            .and_then(|d| d.flag(restriction))
            .unwrap_or(true)
    }

    pub fn meets_all(&self, restrictions: &Restrictions) -> bool {
        restrictions.active().all(|r| self.meets(r))
    }

    /// Choice members carry a non-empty key
    pub fn is_choice_member(&self) -> bool {
        !self.option_key.is_empty()
    }
}

/// An ingredient slot in a recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    /// Filled from the `ingredients` key when omitted
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub is_choice: bool,
    pub options: Vec<IngredientOption>,
    #[serde(default)]
    pub depends_on: Option<DependsOn>,
    #[serde(default)]
    pub line_group: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
}

impl TokenData {
    pub fn choice_members(&self) -> impl Iterator<Item = &IngredientOption> {
        self.options.iter().filter(|o| o.is_choice_member())
    }

    pub fn member(&self, key: &str) -> Option<&IngredientOption> {
        self.choice_members().find(|o| o.option_key == key)
    }

    /// Option-level condition wins over the token-level one
    pub fn depends_on_for<'a>(&'a self, option: &'a IngredientOption) -> Option<&'a DependsOn> {
        option.depends_on.as_ref().or(self.depends_on.as_ref())
    }

    pub fn line_group_for<'a>(&'a self, option: &'a IngredientOption) -> Option<&'a str> {
        option.line_group.as_deref().or(self.line_group.as_deref())
    }

    pub fn section_for<'a>(&'a self, option: &'a IngredientOption) -> Option<&'a str> {
        option.section.as_deref().or(self.section.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceInfo {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub default_option: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub text: String,
    #[serde(default)]
    pub section: Option<String>,
}

fn default_base() -> f64 {
    1.0
}

/// A normalized recipe document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_base")]
    pub default_base: f64,
    pub token_order: Vec<String>,
    pub ingredients: HashMap<String, TokenData>,
    #[serde(default)]
    pub choices: HashMap<String, ChoiceInfo>,
    #[serde(default)]
    pub ingredient_sections: Vec<String>,
    #[serde(default)]
    pub step_sections: Vec<String>,
    #[serde(default)]
    pub steps_raw: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Whether some combination of choices satisfies each restriction
    #[serde(default)]
    pub compatibility_possible: Option<Restrictions>,
}

impl Recipe {
    /// Deserialize a recipe document without contract checks
    pub fn from_json(json: &str, source_id: &str) -> LarderResult<Self> {
        let mut recipe: Recipe =
            serde_json::from_str(json).map_err(|e| LarderError::parse(&e, source_id, json))?;
        for (key, data) in recipe.ingredients.iter_mut() {
            if data.token.is_empty() {
                data.token = key.clone();
            }
        }
        Ok(recipe)
    }

    /// Ingredient entry for a token, failing loudly when it is missing
    pub fn token(&self, token: &str) -> LarderResult<&TokenData> {
        self.ingredients
            .get(token)
            .ok_or_else(|| LarderError::UnknownToken {
                recipe: self.id.clone(),
                token: token.to_string(),
            })
    }

    /// Choice tokens with their entries, in declared order
    pub fn choice_tokens(&self) -> impl Iterator<Item = (&str, &TokenData)> {
        self.token_order
            .iter()
            .filter_map(|t| Some((t.as_str(), self.ingredients.get(t)?)))
            .filter(|(_, data)| data.is_choice)
    }

    pub fn default_option_key(&self, token: &str) -> Option<&str> {
        self.choices
            .get(token)
            .and_then(|c| c.default_option.as_deref())
    }

    /// Whether each restriction is achievable by some combination of choices
    ///
    /// Uses the authored flags when present, otherwise derives them: every
    /// token needs at least one candidate option meeting the restriction.
    pub fn compatibility_possible(&self) -> Restrictions {
        if let Some(flags) = self.compatibility_possible {
            return flags;
        }
        let mut possible = Restrictions::default();
        for restriction in Restriction::ALL {
            let achievable = self.ingredients.values().all(|data| {
                let mut candidates: Vec<&IngredientOption> = if data.is_choice {
                    data.choice_members().collect()
                } else {
                    data.options.iter().take(1).collect()
                };
                if candidates.is_empty() {
                    candidates = data.options.iter().take(1).collect();
                }
                candidates.iter().any(|o| o.meets(restriction))
            });
            possible.set(restriction, achievable);
        }
        possible
    }
}
