use crate::nutrition::{BatchTotals, MacroTotals, MealTargets};
use serde::Serialize;

/// One resolved ingredient entry before line-group merging
///
/// Merging is presentation-only; totals and dependency logic work on
/// these entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEntry {
    pub token: String,
    pub option_key: String,
    pub ingredient_id: String,
    /// Scaled amount in `unit`; absent when the ratio is empty or unparseable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub unit: String,
    pub text: String,
}

/// A display line; several entries when a line group merged them
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedLine {
    pub text: String,
    /// Compatible sibling options the user could swap to
    pub alternatives: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<LineEntry>,
}

impl RenderedLine {
    pub fn plain(text: impl Into<String>, section: Option<String>) -> Self {
        Self {
            text: text.into(),
            alternatives: Vec::new(),
            section,
            entries: Vec::new(),
        }
    }

    /// Line text with the alternatives annotation, e.g. `2 eggs (or flax / aquafaba)`
    pub fn annotated(&self) -> String {
        if self.alternatives.is_empty() {
            self.text.clone()
        } else {
            format!("{} (or {})", self.text, self.alternatives.join(" / "))
        }
    }
}

/// Lines under one section header; unsectioned lines carry no label
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSection {
    pub section_label: Option<String>,
    pub lines: Vec<RenderedLine>,
}

/// Nutrition answer for one recipe at one batch size
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionReport {
    pub servings_estimate: Option<u32>,
    pub per_serving_totals: Option<MacroTotals>,
    pub batch_totals: BatchTotals,
    pub debug_targets: Option<MealTargets>,
}

/// Everything a view needs for one render pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedRecipe {
    pub id: String,
    pub title: String,
    pub effective_multiplier: f64,
    pub ingredients: Vec<LineSection>,
    pub steps: Vec<LineSection>,
}
