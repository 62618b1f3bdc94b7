//! # Larder Engine
//!
//! **Recipes at any batch size**
//!
//! Larder renders a recipe's ingredients and steps at an arbitrary batch size,
//! picks one ingredient variant per slot under dietary toggles and
//! inter-ingredient dependencies, and suggests a serving count from the
//! batch's nutrition.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use larder::{Engine, LarderResult, MealType};
//!
//! fn main() -> LarderResult<()> {
//!     let mut engine = Engine::new();
//!
//!     let id = engine.add_recipe_json(r#"{
//!         "id": "pancakes",
//!         "title": "Pancakes",
//!         "tokenOrder": ["flour", "milk"],
//!         "ingredients": {
//!             "flour": {"options": [{"display": "flour", "ratio": "1 1/2", "unit": "cup"}]},
//!             "milk": {"options": [{"display": "milk", "ratio": "1", "unit": "cup"}]}
//!         }
//!     }"#, "pancakes.json")?;
//!
//!     let mut state = engine.new_session(&id)?;
//!     state.multiplier = 2.0;
//!     let lines = engine.render_ingredients(&id, &mut state)?;
//!     let nutrition = engine.nutrition_report(&id, &mut state, MealType::Breakfast)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Tokens
//! A token is one ingredient slot. A choice token offers several named
//! options (butter or oil, egg or flax); a plain token has exactly one.
//!
//! ### Render state
//! Each open view owns a `RenderState`: the batch and pan multipliers, the
//! user's swaps, the active dietary restrictions and preferred units.
//! Resolution caches its choices back into that state.
//!
//! ### Degrade, don't throw
//! Unparseable ratios, unknown units and missing nutrition rows never fail a
//! render. They show up as literal text, unconverted amounts, or a batch
//! flagged incomplete. Only contract violations in the recipe document are
//! errors.

pub mod engine;
pub mod error;
pub mod fraction;
pub mod nutrition;
pub mod pan;
pub mod recipe;
pub mod render;
pub mod resolver;
pub mod response;
pub mod settings;
pub mod state;
pub mod units;
pub mod validator;

pub use engine::Engine;
pub use error::{LarderError, ParseDetails};
pub use fraction::{
    format_amount_for_display, format_fraction, multiply_fraction, parse_ratio, Fraction,
};
pub use nutrition::{
    compute_batch_totals, estimate_servings, BatchTotals, Coverage, MacroTotals, MealTargets,
    MealType, ServingEstimate,
};
pub use pan::{pan_multiplier, PanSize};
pub use recipe::{
    ChoiceInfo, DependsOn, Dietary, IngredientOption, NutritionVariant, Recipe, Restriction,
    Restrictions, Step, TokenData,
};
pub use render::{group_lines_by_section, render_ingredients, render_steps};
pub use resolver::{resolve_option, select_option_for_token, RestrictionStatus};
pub use response::{LineEntry, LineSection, NutritionReport, RenderedLine, RenderedRecipe};
pub use settings::{Ceiling, EngineConfig, NutritionPolicy, NutritionSettings, PenaltyWeights};
pub use state::RenderState;
pub use units::{convert_unit_amount, normalize_unit, ConversionTable, Converter, UnitRegistry};
pub use validator::{validate_recipe, Validator};

/// Result type for larder operations
pub type LarderResult<T> = Result<T, LarderError>;
