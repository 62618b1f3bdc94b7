use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};
use larder::resolver::resolve_default;
use larder::units::ConvertedAmount;
use larder::{
    format_amount_for_display, LineSection, MealTargets, MealType, NutritionReport, Recipe,
    RenderedRecipe, Restriction, RestrictionStatus, UnitRegistry,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// How a nutrient row compares against the meal target
enum TargetKind {
    About,
    AtMost,
    AtLeast,
}

impl TargetKind {
    fn format_target(&self, value: f64, unit: &str) -> String {
        let symbol = match self {
            TargetKind::About => "≈",
            TargetKind::AtMost => "≤",
            TargetKind::AtLeast => "≥",
        };
        format!("{} {}{}", symbol, round(value, 1), unit)
    }
}

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn format_recipe(&self, rendered: &RenderedRecipe, raw: bool) -> String {
        if raw {
            return self.format_raw(rendered);
        }

        let mut output = String::new();
        let title = if rendered.title.is_empty() {
            &rendered.id
        } else {
            &rendered.title
        };
        if (rendered.effective_multiplier - 1.0).abs() > 1e-9 {
            output.push_str(&format!(
                "{} (x{})\n\n",
                title,
                round(rendered.effective_multiplier, 2)
            ));
        } else {
            output.push_str(&format!("{}\n\n", title));
        }

        if !rendered.ingredients.is_empty() {
            output.push_str(&self.format_sections("Ingredients", &rendered.ingredients, false));
            output.push('\n');
        }
        if !rendered.steps.is_empty() {
            output.push_str(&self.format_sections("Steps", &rendered.steps, true));
            output.push('\n');
        }

        output
    }

    // One line per ingredient, a blank line, then one line per step
    fn format_raw(&self, rendered: &RenderedRecipe) -> String {
        let mut output = String::new();
        for line in rendered.ingredients.iter().flat_map(|s| &s.lines) {
            output.push_str(&line.text);
            output.push('\n');
        }
        if !rendered.steps.is_empty() {
            output.push('\n');
            for line in rendered.steps.iter().flat_map(|s| &s.lines) {
                output.push_str(&line.text);
                output.push('\n');
            }
        }
        output
    }

    fn format_sections(&self, heading: &str, sections: &[LineSection], numbered: bool) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new(heading).set_alignment(CellAlignment::Left)
        ]));

        let mut step = 0;
        for section in sections {
            let mut content = String::new();
            if let Some(label) = &section.section_label {
                content.push_str(label);
                content.push('\n');
            }
            for line in &section.lines {
                if numbered {
                    step += 1;
                    content.push_str(&format!("{}. {}\n", step, line.text));
                } else {
                    content.push_str(&format!("- {}\n", line.text));
                }
                if !line.alternatives.is_empty() {
                    content.push_str(&format!("    or: {}\n", line.alternatives.join(" / ")));
                }
            }
            table.add_row(Row::from(vec![Cell::new(content.trim_end())]));
        }

        table.to_string()
    }

    pub fn format_recipe_inspection(
        &self,
        recipe: &Recipe,
        statuses: &[(Restriction, RestrictionStatus)],
    ) -> String {
        let mut output = String::new();
        output.push_str(&format!("Recipe: {}\n", recipe.id));
        if !recipe.title.is_empty() {
            output.push_str(&format!("Title: {}\n", recipe.title));
        }

        output.push_str(&format!("\ntokens ({}):\n", recipe.token_order.len()));
        for token in &recipe.token_order {
            let Some(data) = recipe.ingredients.get(token) else {
                continue;
            };
            let mut line = format!("  - {}", token);
            if let Some(section) = &data.section {
                line.push_str(&format!(" [{}]", section));
            }
            if let Some(dep) = &data.depends_on {
                match &dep.option {
                    Some(option) => {
                        line.push_str(&format!(" (depends on {}={})", dep.token, option))
                    }
                    None => line.push_str(&format!(" (depends on {})", dep.token)),
                }
            }
            output.push_str(&line);
            output.push('\n');
        }

        let choices: Vec<&String> = recipe
            .token_order
            .iter()
            .filter(|t| recipe.ingredients.get(*t).is_some_and(|d| d.is_choice))
            .collect();
        output.push_str(&format!("\nchoices ({}):\n", choices.len()));
        for token in choices {
            let data = &recipe.ingredients[token];
            let label = recipe
                .choices
                .get(token)
                .map(|c| c.label.as_str())
                .filter(|l| !l.is_empty())
                .unwrap_or(token.as_str());
            let default_key = resolve_default(recipe, data).map(|o| o.option_key.as_str());
            output.push_str(&format!("  {}:\n", label));
            for option in data.choice_members() {
                let marker = if Some(option.option_key.as_str()) == default_key {
                    " (default)"
                } else {
                    ""
                };
                output.push_str(&format!(
                    "    - {}: {}{}\n",
                    option.option_key, option.display, marker
                ));
            }
        }

        output.push_str("\nrestrictions:\n");
        for (restriction, status) in statuses {
            let state = match status {
                RestrictionStatus::Cannot => "cannot be met",
                RestrictionStatus::Ready { locked: true } => "already met",
                RestrictionStatus::Ready { locked: false } => "met by default",
                RestrictionStatus::CanBecome => "available",
            };
            output.push_str(&format!("  - {}: {}\n", restriction, state));
        }

        output
    }

    pub fn format_workspace_summary(&self, file_count: usize, recipes: &[&Recipe]) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Workspace contains {} files, {} recipes\n\n",
            file_count,
            recipes.len()
        ));
        if recipes.is_empty() {
            return output;
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec!["Recipe", "Title", "Tokens", "Choices"]));
        for recipe in recipes {
            let choices = recipe.ingredients.values().filter(|d| d.is_choice).count();
            table.add_row(Row::from(vec![
                Cell::new(&recipe.id),
                Cell::new(&recipe.title),
                Cell::new(recipe.token_order.len()).set_alignment(CellAlignment::Right),
                Cell::new(choices).set_alignment(CellAlignment::Right),
            ]));
        }
        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    pub fn format_nutrition(&self, id: &str, meal: MealType, report: &NutritionReport) -> String {
        let batch = &report.batch_totals;
        let mut output = String::new();
        output.push_str(&format!("Nutrition for {} ({})\n\n", id, meal));

        output.push_str(&format!(
            "Coverage: {}/{} ingredients",
            batch.coverage.covered, batch.coverage.total
        ));
        if batch.complete {
            output.push_str(" (complete)\n");
        } else if batch.missing_tokens.is_empty() {
            output.push_str(" (incomplete)\n");
        } else {
            output.push_str(&format!(" (missing: {})\n", batch.missing_tokens.join(", ")));
        }
        match report.servings_estimate {
            Some(servings) => output.push_str(&format!("Suggested servings: {}\n\n", servings)),
            None => {
                output.push_str("Suggested servings: not estimated (incomplete nutrition data)\n\n")
            }
        }

        let totals = &batch.totals;
        let per = report.per_serving_totals.as_ref();
        let targets = report.debug_targets.as_ref();
        let rows: Vec<(&str, &str, f64, Option<f64>, Option<String>)> = vec![
            (
                "Energy",
                " kcal",
                totals.kcal,
                per.map(|p| p.kcal),
                target(targets, |t| (TargetKind::About, t.kcal)),
            ),
            (
                "Protein",
                " g",
                totals.protein_g,
                per.map(|p| p.protein_g),
                target(targets, |t| (TargetKind::AtLeast, t.protein_floor_g)),
            ),
            ("Fat", " g", totals.fat_g, per.map(|p| p.fat_g), None),
            (
                "Saturated fat",
                " g",
                totals.sat_fat_g,
                per.map(|p| p.sat_fat_g),
                target(targets, |t| (TargetKind::AtMost, t.sat_fat_limit_g)),
            ),
            ("Carbohydrates", " g", totals.carbs_g, per.map(|p| p.carbs_g), None),
            ("Sugars", " g", totals.sugars_g, per.map(|p| p.sugars_g), None),
            (
                "Fiber",
                " g",
                totals.fiber_g,
                per.map(|p| p.fiber_g),
                target(targets, |t| (TargetKind::AtLeast, t.fiber_target_g)),
            ),
            (
                "Sodium",
                " mg",
                totals.sodium_mg,
                per.map(|p| p.sodium_mg),
                target(targets, |t| (TargetKind::AtMost, t.sodium_limit_mg)),
            ),
        ];

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec!["Nutrient", "Batch", "Per serving", "Meal target"]));
        for (name, unit, batch_value, per_value, target_text) in rows {
            table.add_row(nutrient_row(name, unit, Some(batch_value), per_value, target_text));
        }
        if let Some(added) = totals.added_sugar_g {
            let per_added = per.and_then(|p| p.added_sugar_g);
            let target_text = target(targets, |t| (TargetKind::AtMost, t.added_sugar_limit_g));
            table.add_row(nutrient_row("Added sugar", " g", Some(added), per_added, target_text));
        }

        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    pub fn format_conversion(
        &self,
        amount: f64,
        from: &str,
        converted: &ConvertedAmount,
        registry: &UnitRegistry,
    ) -> String {
        let from_label = registry
            .lookup(from)
            .map(|d| d.label_for(amount).to_string())
            .unwrap_or_else(|| from.to_string());
        let to_label = registry
            .lookup(&converted.unit)
            .map(|d| d.label_for(converted.amount).to_string())
            .unwrap_or_else(|| converted.unit.clone());
        format!(
            "{} {} = {} {}",
            format_amount_for_display(amount),
            from_label,
            format_amount_for_display(converted.amount),
            to_label
        )
    }
}

fn target(
    targets: Option<&MealTargets>,
    pick: impl Fn(&MealTargets) -> (TargetKind, f64),
) -> Option<String> {
    targets.map(|t| {
        let (kind, value) = pick(t);
        kind.format_target(value, "")
    })
}

fn nutrient_row(
    name: &str,
    unit: &str,
    batch: Option<f64>,
    per_serving: Option<f64>,
    target: Option<String>,
) -> Row {
    let cell = |value: Option<f64>| {
        Cell::new(value.map_or_else(|| "-".to_string(), |v| format!("{}{}", round(v, 1), unit)))
            .set_alignment(CellAlignment::Right)
    };
    Row::from(vec![
        Cell::new(name),
        cell(batch),
        cell(per_serving),
        Cell::new(target.map_or_else(|| "-".to_string(), |t| format!("{}{}", t, unit))),
    ])
}

fn round(value: f64, dp: u32) -> String {
    match Decimal::from_f64(value) {
        Some(d) => d.round_dp(dp).normalize().to_string(),
        None => format!("{:.1$}", value, dp as usize),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder::{Engine, Restriction};

    const OMELET: &str = r#"{
        "id": "omelet",
        "title": "Omelet",
        "tokenOrder": ["egg", "fat", "cheese"],
        "choices": {"fat": {"label": "Cooking fat", "defaultOption": "butter"}},
        "ingredients": {
            "egg": {"options": [{"display": "egg", "ratio": "2", "unit": "each", "dietary": {"eggFree": false}}]},
            "fat": {"isChoice": true, "options": [
                {"optionKey": "butter", "display": "butter", "ratio": "1", "unit": "tbsp", "dietary": {"dairyFree": false}},
                {"optionKey": "oil", "display": "olive oil", "ratio": "1", "unit": "tbsp", "dietary": {"dairyFree": true}}
            ]},
            "cheese": {"dependsOn": {"token": "fat", "option": "butter"},
                       "options": [{"display": "grated cheddar", "ratio": "1/4", "unit": "cup"}]}
        },
        "stepsRaw": ["Beat the {egg}.", "Cook in {fat}."]
    }"#;

    fn engine() -> Engine {
        let mut engine = Engine::new();
        engine.add_recipe_json(OMELET, "omelet.json").unwrap();
        engine
    }

    #[test]
    fn test_raw_output_is_plain_lines() {
        let engine = engine();
        let mut state = engine.new_session("omelet").unwrap();
        let rendered = engine.render("omelet", &mut state).unwrap();
        let output = Formatter::default().format_recipe(&rendered, true);
        assert_eq!(
            output,
            "2 eggs\n1 tbsp butter\n1/4 cup grated cheddar\n\nBeat the egg.\nCook in butter.\n"
        );
    }

    #[test]
    fn test_table_output_shows_alternatives_and_numbered_steps() {
        let engine = engine();
        let mut state = engine.new_session("omelet").unwrap();
        state.multiplier = 2.0;
        let rendered = engine.render("omelet", &mut state).unwrap();
        let output = Formatter::default().format_recipe(&rendered, false);
        assert!(output.starts_with("Omelet (x2)\n"));
        assert!(output.contains("- 4 eggs"));
        assert!(output.contains("or: olive oil"));
        assert!(output.contains("1. Beat the egg."));
        assert!(output.contains("2. Cook in butter."));
    }

    #[test]
    fn test_inspection_marks_default_and_statuses() {
        let engine = engine();
        let recipe = engine.get_recipe("omelet").unwrap();
        let statuses = engine.restriction_statuses("omelet").unwrap();
        let output = Formatter::default().format_recipe_inspection(recipe, &statuses);
        assert!(output.contains("tokens (3):"));
        assert!(output.contains("  - cheese (depends on fat=butter)"));
        assert!(output.contains("  Cooking fat:"));
        assert!(output.contains("    - butter: butter (default)"));
        assert!(output.contains("    - oil: olive oil\n"));
        assert!(output.contains(&format!("  - {}: cannot be met", Restriction::EggFree)));
        assert!(output.contains(&format!("  - {}: available", Restriction::DairyFree)));
    }

    #[test]
    fn test_conversion_labels() {
        let registry = UnitRegistry::standard();
        let converted = ConvertedAmount {
            amount: 30.0,
            unit: "ml".to_string(),
        };
        let output =
            Formatter::default().format_conversion(2.0, "tablespoons", &converted, registry);
        assert_eq!(output, "2 tbsp = 30 ml");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round(449.58333, 1), "449.6");
        assert_eq!(round(3.0, 1), "3");
        assert_eq!(round(0.25, 2), "0.25");
    }
}
