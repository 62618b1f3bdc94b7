use crate::recipe::{DependsOn, Recipe, TokenData};
use crate::{LarderError, LarderResult};
use std::collections::HashSet;

/// Structural checks a recipe must pass before the engine accepts it
///
/// These are the contract violations the resolver treats as programmer
/// errors. Every violation is reported at once.
#[derive(Debug, Default, Clone, Copy)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, recipe: &Recipe) -> LarderResult<()> {
        let mut errors = Vec::new();

        // Phase 1: token order is a duplicate-free cover of the ingredients
        self.check_token_order(recipe, &mut errors);

        // Phase 2: every token offers something to resolve to
        self.check_options(recipe, &mut errors);

        // Phase 3: dependencies point at real tokens, one level deep
        self.check_dependencies(recipe, &mut errors);

        match LarderError::collect(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn check_token_order(&self, recipe: &Recipe, errors: &mut Vec<LarderError>) {
        let mut seen = HashSet::new();
        for token in &recipe.token_order {
            if !seen.insert(token.as_str()) {
                errors.push(LarderError::contract(
                    recipe.id.as_str(),
                    format!("token '{}' appears more than once in tokenOrder", token),
                ));
            }
            if !recipe.ingredients.contains_key(token) {
                errors.push(LarderError::UnknownToken {
                    recipe: recipe.id.clone(),
                    token: token.clone(),
                });
            }
        }

        let mut uncovered: Vec<&str> = recipe
            .ingredients
            .keys()
            .map(String::as_str)
            .filter(|token| !seen.contains(token))
            .collect();
        uncovered.sort_unstable();
        for token in uncovered {
            errors.push(LarderError::contract(
                recipe.id.as_str(),
                format!("ingredient '{}' is missing from tokenOrder", token),
            ));
        }
    }

    fn check_options(&self, recipe: &Recipe, errors: &mut Vec<LarderError>) {
        for data in self.tokens_in_order(recipe) {
            if data.options.is_empty() {
                errors.push(LarderError::contract(
                    recipe.id.as_str(),
                    format!("token '{}' has no options", data.token),
                ));
            }
        }
    }

    fn check_dependencies(&self, recipe: &Recipe, errors: &mut Vec<LarderError>) {
        for data in self.tokens_in_order(recipe) {
            for dep in declared_dependencies(data) {
                let Some(controller) = recipe.ingredients.get(&dep.token) else {
                    errors.push(LarderError::UnknownDependency {
                        recipe: recipe.id.clone(),
                        token: data.token.clone(),
                        depends_on: dep.token.clone(),
                    });
                    continue;
                };
                if declared_dependencies(controller).next().is_some() {
                    errors.push(LarderError::NestedDependency {
                        recipe: recipe.id.clone(),
                        token: data.token.clone(),
                        controller: dep.token.clone(),
                    });
                }
            }
        }
    }

    fn tokens_in_order<'r>(&self, recipe: &'r Recipe) -> impl Iterator<Item = &'r TokenData> {
        let mut seen = HashSet::new();
        recipe
            .token_order
            .iter()
            .filter(move |token| seen.insert(token.as_str()))
            .filter_map(|token| recipe.ingredients.get(token))
    }
}

/// Token-level and option-level `dependsOn` entries
fn declared_dependencies(data: &TokenData) -> impl Iterator<Item = &DependsOn> {
    let mut seen = HashSet::new();
    data.depends_on
        .iter()
        .chain(data.options.iter().filter_map(|o| o.depends_on.as_ref()))
        .filter(move |dep| seen.insert(dep.token.as_str()))
}

/// Validate one recipe with the default validator
pub fn validate_recipe(recipe: &Recipe) -> LarderResult<()> {
    Validator::new().validate(recipe)
}
