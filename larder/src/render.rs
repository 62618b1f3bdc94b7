//! Line rendering and grouping
//!
//! Turns resolved options into scaled display lines:
//! 1. Resolve every token and drop dependents whose condition fails
//! 2. Scale each ratio by the effective multiplier
//! 3. Merge entries sharing a line group into one line
//! 4. Bucket lines by section

use crate::fraction::{format_amount_for_display, format_fraction, multiply_fraction, parse_ratio};
use crate::recipe::{IngredientOption, Recipe};
use crate::resolver::{compatible_alternatives, resolve_all, ResolvedToken};
use crate::response::{LineEntry, LineSection, RenderedLine};
use crate::state::RenderState;
use crate::units::registry::is_one;
use crate::units::{Converter, UnitGroup};
use crate::LarderResult;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Joins entries merged by a shared line group
pub const LINE_GROUP_SEPARATOR: &str = " + ";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_\-]+)\}").expect("placeholder pattern is valid"));

/// Append "s" unless the word already ends in "s" or the amount is one
pub fn pluralize(word: &str, amount: f64) -> String {
    if word.is_empty() || is_one(amount) || word.ends_with('s') {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

// "egg, beaten" pluralizes as "eggs, beaten"
fn pluralize_display(display: &str, amount: f64) -> String {
    match display.split_once(',') {
        Some((head, rest)) => format!("{},{}", pluralize(head, amount), rest),
        None => pluralize(display, amount),
    }
}

fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one resolved option into an un-merged entry
pub fn render_entry(
    token: &str,
    option: &IngredientOption,
    state: &RenderState,
    converter: &Converter,
) -> LineEntry {
    let mut entry = LineEntry {
        token: token.to_string(),
        option_key: option.option_key.clone(),
        ingredient_id: option.ingredient_id.clone(),
        amount: None,
        unit: option.unit.clone(),
        text: String::new(),
    };

    let Some(ratio) = parse_ratio(&option.ratio) else {
        // Unscalable: show what was authored
        entry.text = join_parts(&[option.ratio.trim(), option.unit.trim(), &option.display]);
        return entry;
    };

    let scaled = multiply_fraction(ratio, state.effective_multiplier());
    let preferred = state.unit_selections.get(token).and_then(|target| {
        converter.convert_for_ingredient(
            scaled.to_f64(),
            &option.unit,
            target,
            &option.ingredient_id,
        )
    });

    let (amount, amount_text, unit) = match preferred {
        Some(converted) => (
            converted.amount,
            format_amount_for_display(converted.amount),
            converted.unit,
        ),
        None => (scaled.to_f64(), format_fraction(scaled), option.unit.clone()),
    };

    let registry = converter.registry();
    let (unit_text, counted) = match registry.lookup(&unit) {
        Some(def) if def.group == UnitGroup::Count && def.label.is_empty() => {
            (String::new(), true)
        }
        Some(def) if def.group == UnitGroup::Count => (pluralize(&def.label, amount), false),
        Some(def) => (def.label_for(amount).to_string(), false),
        None => (unit.trim().to_string(), unit.trim().is_empty()),
    };
    let display = if counted {
        pluralize_display(&option.display, amount)
    } else {
        option.display.clone()
    };

    entry.text = join_parts(&[&amount_text, &unit_text, &display]);
    entry.amount = Some(amount);
    entry.unit = unit;
    entry
}

/// Render visible ingredient lines in token order, merging line groups
pub fn render_ingredient_lines(
    recipe: &Recipe,
    state: &mut RenderState,
    converter: &Converter,
) -> LarderResult<Vec<RenderedLine>> {
    let resolved = resolve_all(recipe, state)?;
    let mut lines: Vec<RenderedLine> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();

    for ResolvedToken {
        token,
        data,
        option,
        visible,
    } in resolved.iter().cloned()
    {
        if !visible {
            continue;
        }
        let entry = render_entry(token, option, state, converter);
        let alternatives: Vec<String> = compatible_alternatives(data, option, &state.restrictions)
            .into_iter()
            .map(|o| o.display.clone())
            .collect();

        if let Some(group) = data.line_group_for(option) {
            if let Some(&index) = group_index.get(group) {
                let line = &mut lines[index];
                line.text.push_str(LINE_GROUP_SEPARATOR);
                line.text.push_str(&entry.text);
                line.alternatives.extend(alternatives);
                line.entries.push(entry);
                continue;
            }
            group_index.insert(group, lines.len());
        }

        lines.push(RenderedLine {
            text: entry.text.clone(),
            alternatives,
            section: data.section_for(option).map(str::to_string),
            entries: vec![entry],
        });
    }
    Ok(lines)
}

/// Bucket lines by section
///
/// Unsectioned lines come first with no header. Named sections follow in
/// `ordered_sections` order, then any undeclared sections in order of first
/// appearance. Lines keep their relative order inside each bucket.
pub fn group_lines_by_section(
    lines: Vec<RenderedLine>,
    ordered_sections: &[String],
) -> Vec<LineSection> {
    let mut unsectioned = Vec::new();
    let mut buckets: Vec<(String, Vec<RenderedLine>)> = ordered_sections
        .iter()
        .map(|name| (name.clone(), Vec::new()))
        .collect();

    for line in lines {
        let Some(section) = line.section.clone() else {
            unsectioned.push(line);
            continue;
        };
        match buckets.iter_mut().find(|(name, _)| *name == section) {
            Some((_, bucket)) => bucket.push(line),
            None => buckets.push((section, vec![line])),
        }
    }

    let mut sections = Vec::new();
    if !unsectioned.is_empty() {
        sections.push(LineSection {
            section_label: None,
            lines: unsectioned,
        });
    }
    sections.extend(
        buckets
            .into_iter()
            .filter(|(_, lines)| !lines.is_empty())
            .map(|(name, lines)| LineSection {
                section_label: Some(name),
                lines,
            }),
    );
    sections
}

pub fn render_ingredients(
    recipe: &Recipe,
    state: &mut RenderState,
    converter: &Converter,
) -> LarderResult<Vec<LineSection>> {
    let lines = render_ingredient_lines(recipe, state, converter)?;
    Ok(group_lines_by_section(lines, &recipe.ingredient_sections))
}

/// Render steps, substituting `{token}` with the resolved option's name
///
/// Structured steps are used when present, otherwise the raw step strings.
pub fn render_steps(recipe: &Recipe, state: &mut RenderState) -> LarderResult<Vec<LineSection>> {
    let resolved = resolve_all(recipe, state)?;
    let names: HashMap<&str, &str> = resolved
        .iter()
        .map(|r| (r.token, r.option.display.as_str()))
        .collect();

    let substitute = |text: &str| {
        PLACEHOLDER
            .replace_all(text, |caps: &regex::Captures| match names.get(&caps[1]) {
                Some(name) => name.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    };

    let lines: Vec<RenderedLine> = if recipe.steps.is_empty() {
        recipe
            .steps_raw
            .iter()
            .map(|text| RenderedLine::plain(substitute(text), None))
            .collect()
    } else {
        recipe
            .steps
            .iter()
            .map(|step| RenderedLine::plain(substitute(&step.text), step.section.clone()))
            .collect()
    };
    Ok(group_lines_by_section(lines, &recipe.step_sections))
}
