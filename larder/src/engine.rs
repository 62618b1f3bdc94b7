use crate::nutrition::{compute_batch_totals, estimate_servings, BatchTotals, MealTargets, MealType};
use crate::render;
use crate::resolver::{restriction_statuses, RestrictionStatus};
use crate::{
    Converter, EngineConfig, LarderError, LarderResult, LineSection, NutritionReport, Recipe,
    RenderState, RenderedRecipe, Restriction, Validator,
};
use std::collections::HashMap;
use tracing::info;

/// The larder recipe engine
///
/// Holds validated recipes by id together with the unit converter and the
/// nutrition configuration. Recipes are read-only once registered; all
/// per-view state lives in the caller's `RenderState`.
pub struct Engine {
    recipes: HashMap<String, Recipe>,
    sources: HashMap<String, String>,
    validator: Validator,
    converter: Converter,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            recipes: HashMap::new(),
            sources: HashMap::new(),
            validator: Validator,
            converter: Converter::standard(),
            config: EngineConfig::default(),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom unit table or ingredient conversions
    pub fn with_converter(mut self, converter: Converter) -> Self {
        self.converter = converter;
        self
    }

    /// Use custom nutrition settings and policy
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Validate and register a recipe, replacing any with the same id
    pub fn add_recipe(&mut self, recipe: Recipe) -> LarderResult<()> {
        self.validator.validate(&recipe)?;
        info!(
            recipe = recipe.id.as_str(),
            tokens = recipe.token_order.len(),
            "recipe registered"
        );
        self.recipes.insert(recipe.id.clone(), recipe);
        Ok(())
    }

    /// Parse, validate and register a recipe document; returns its id
    pub fn add_recipe_json(&mut self, json: &str, source_id: &str) -> LarderResult<String> {
        let recipe = Recipe::from_json(json, source_id)?;
        let id = recipe.id.clone();
        self.add_recipe(recipe)?;
        self.sources.insert(id.clone(), source_id.to_string());
        Ok(id)
    }

    pub fn remove_recipe(&mut self, id: &str) -> Option<Recipe> {
        self.sources.remove(id);
        self.recipes.remove(id)
    }

    /// Registered recipe ids, sorted
    pub fn list_recipes(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.recipes.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn get_recipe(&self, id: &str) -> LarderResult<&Recipe> {
        self.recipes
            .get(id)
            .ok_or_else(|| LarderError::UnknownRecipe(id.to_string()))
    }

    /// Where a recipe was loaded from, when it came from a document
    pub fn source_of(&self, id: &str) -> Option<&str> {
        self.sources.get(id).map(String::as_str)
    }

    /// Fresh state for a new view of a recipe
    pub fn new_session(&self, id: &str) -> LarderResult<RenderState> {
        Ok(RenderState::for_recipe(self.get_recipe(id)?))
    }

    pub fn render_ingredients(
        &self,
        id: &str,
        state: &mut RenderState,
    ) -> LarderResult<Vec<LineSection>> {
        render::render_ingredients(self.get_recipe(id)?, state, &self.converter)
    }

    pub fn render_steps(
        &self,
        id: &str,
        state: &mut RenderState,
    ) -> LarderResult<Vec<LineSection>> {
        render::render_steps(self.get_recipe(id)?, state)
    }

    /// Ingredients and steps in one pass
    pub fn render(&self, id: &str, state: &mut RenderState) -> LarderResult<RenderedRecipe> {
        let recipe = self.get_recipe(id)?;
        let ingredients = render::render_ingredients(recipe, state, &self.converter)?;
        let steps = render::render_steps(recipe, state)?;
        Ok(RenderedRecipe {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            effective_multiplier: state.effective_multiplier(),
            ingredients,
            steps,
        })
    }

    pub fn restriction_statuses(
        &self,
        id: &str,
    ) -> LarderResult<Vec<(Restriction, RestrictionStatus)>> {
        Ok(restriction_statuses(self.get_recipe(id)?))
    }

    pub fn batch_totals(&self, id: &str, state: &mut RenderState) -> LarderResult<BatchTotals> {
        compute_batch_totals(self.get_recipe(id)?, state, &self.converter)
    }

    /// Batch totals plus a serving suggestion for `meal`
    ///
    /// Targets are always reported; the estimate only when the batch is complete.
    pub fn nutrition_report(
        &self,
        id: &str,
        state: &mut RenderState,
        meal: MealType,
    ) -> LarderResult<NutritionReport> {
        let batch = self.batch_totals(id, state)?;
        let EngineConfig { settings, policy } = &self.config;
        let estimate = estimate_servings(&batch, settings, meal, policy);
        let debug_targets = match &estimate {
            Some(estimate) => estimate.targets.clone(),
            None => MealTargets::compute(settings, policy, meal),
        };
        Ok(NutritionReport {
            servings_estimate: estimate.as_ref().map(|e| e.servings),
            per_serving_totals: estimate.map(|e| e.per_serving),
            batch_totals: batch,
            debug_targets: Some(debug_targets),
        })
    }
}
