use anyhow::{Context, Result};
use inquire::{MultiSelect, Select};
use larder::{select_option_for_token, Engine, RenderState, Restriction, RestrictionStatus};

pub fn select_recipe(engine: &Engine) -> Result<String> {
    let recipes = engine.list_recipes();

    if recipes.is_empty() {
        anyhow::bail!("No recipes found in workspace. Add recipe .json files to get started.");
    }

    if recipes.len() == 1 {
        return Ok(recipes[0].clone());
    }

    let display_options: Vec<String> = recipes
        .iter()
        .map(|id| match engine.get_recipe(id) {
            Ok(recipe) if !recipe.title.is_empty() => format!("{} ({})", id, recipe.title),
            _ => id.clone(),
        })
        .collect();

    let selected = Select::new("Select a recipe:", display_options.clone())
        .with_help_message("Use arrow keys to navigate, Enter to select")
        .prompt()
        .context("Failed to get recipe selection")?;

    let index = display_options
        .iter()
        .position(|d| d == &selected)
        .context("Failed to find selected recipe index")?;

    Ok(recipes[index].clone())
}

/// Prompt for restriction toggles, then for every choice token
///
/// Restrictions go first so the choice prompts can start on the option the
/// resolver would pick anyway.
pub fn prompt_session(engine: &Engine, id: &str, state: &mut RenderState) -> Result<()> {
    prompt_restrictions(engine, id, state)?;
    prompt_choices(engine, id, state)
}

fn prompt_restrictions(engine: &Engine, id: &str, state: &mut RenderState) -> Result<()> {
    let available: Vec<Restriction> = engine
        .restriction_statuses(id)?
        .into_iter()
        .filter(|(_, status)| !matches!(status, RestrictionStatus::Cannot))
        .map(|(restriction, _)| restriction)
        .collect();

    if available.is_empty() {
        return Ok(());
    }

    let defaults: Vec<usize> = available
        .iter()
        .enumerate()
        .filter(|(_, r)| state.restrictions.get(**r))
        .map(|(i, _)| i)
        .collect();

    let selected = MultiSelect::new("Dietary restrictions:", available.clone())
        .with_default(&defaults)
        .with_help_message("Space to toggle, Enter to confirm")
        .prompt()
        .context("Failed to get restriction selection")?;

    for restriction in available {
        state.set_restriction(restriction, selected.contains(&restriction));
    }

    Ok(())
}

fn prompt_choices(engine: &Engine, id: &str, state: &mut RenderState) -> Result<()> {
    let recipe = engine.get_recipe(id)?;

    for (token, data) in recipe.choice_tokens() {
        let members: Vec<_> = data
            .choice_members()
            .filter(|o| o.meets_all(&state.restrictions))
            .collect();
        if members.len() < 2 {
            continue;
        }

        let current = select_option_for_token(token, recipe, state)?.option_key.clone();
        let start = members
            .iter()
            .position(|o| o.option_key == current)
            .unwrap_or(0);

        let label = recipe
            .choices
            .get(token)
            .map(|c| c.label.as_str())
            .filter(|l| !l.is_empty())
            .unwrap_or(token);
        let display_options: Vec<String> = members.iter().map(|o| o.display.clone()).collect();

        let selected = Select::new(&format!("{}:", label), display_options.clone())
            .with_starting_cursor(start)
            .prompt()
            .with_context(|| format!("Failed to get selection for {}", label))?;

        let index = display_options
            .iter()
            .position(|d| d == &selected)
            .context("Failed to find selected option index")?;
        state.select(token, members[index].option_key.as_str());
    }

    Ok(())
}
