mod error_formatter;
mod formatter;
mod interactive;
mod server;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use formatter::Formatter;
use larder::{Converter, Engine, EngineConfig, MealType, PanSize, RenderState, Restriction};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Scale, resolve and size recipes for the kitchen you actually have.")]
#[command(
    long_about = "Larder renders normalized recipe documents: it resolves ingredient choices against dietary restrictions,\nscales quantities by batch size or pan size, converts units and suggests a serving count from nutrition data.\nRecipes are loaded from every .json file under the workspace directory."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where recipes and optional data tables come from
#[derive(Args, Debug, Clone)]
struct WorkspaceArgs {
    /// Workspace root directory containing recipe .json files
    #[arg(short = 'd', long = "dir", default_value = ".")]
    workdir: PathBuf,
    /// Per-ingredient conversion table (JSON keyed by ingredient id)
    #[arg(long, value_name = "FILE")]
    conversions: Option<PathBuf>,
    /// Nutrition settings and policy (JSON, see EngineConfig)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Batch size, swaps and dietary toggles for one rendering
#[derive(Args, Debug, Clone, Default)]
struct SessionArgs {
    /// Batch multiplier (default: the recipe's base)
    #[arg(short = 'm', long, value_parser = parse_multiplier)]
    multiplier: Option<f64>,
    /// Scale to a different pan (format: FROM:TO, e.g. 9x13:8sq or 9:10)
    #[arg(long, value_name = "FROM:TO", value_parser = parse_pan)]
    pan: Option<(PanSize, PanSize)>,
    /// Pick an option for a choice token (format: token=option)
    #[arg(
        short = 'c',
        long = "choose",
        value_name = "TOKEN=OPTION",
        value_parser = parse_key_value
    )]
    choose: Vec<(String, String)>,
    /// Turn on a dietary restriction (gluten-free, egg-free, dairy-free)
    #[arg(long = "restrict", value_name = "RESTRICTION")]
    restrict: Vec<Restriction>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a recipe's ingredients and steps
    ///
    /// Resolves every token against your choices and restrictions, scales the
    /// quantities and prints the ingredient lines and steps grouped by section.
    Run {
        /// Id of the recipe to render
        #[arg(value_name = "RECIPE")]
        recipe: Option<String>,
        #[command(flatten)]
        session: SessionArgs,
        /// Preferred display unit for a token (format: token=unit)
        ///
        /// Examples: butter=g, milk=ml
        #[arg(
            short = 'u',
            long = "unit",
            value_name = "TOKEN=UNIT",
            value_parser = parse_key_value
        )]
        unit: Vec<(String, String)>,
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Output plain lines only (for piping to other tools)
        #[arg(short = 'r', long)]
        raw: bool,
        /// Prompt for the recipe, each choice and the restriction toggles
        #[arg(short = 'i', long)]
        interactive: bool,
    },
    /// Show recipe structure
    ///
    /// Lists tokens in display order, the options of every choice and
    /// whether each dietary restriction can be met.
    Show {
        /// Id of the recipe to show
        recipe: String,
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
    /// List all recipes with token and choice counts
    List {
        /// Workspace root directory containing recipe .json files
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// Batch nutrition totals and a suggested serving count
    Nutrition {
        /// Id of the recipe to analyze
        recipe: String,
        /// Meal the servings are sized for
        #[arg(long, default_value = "dinner")]
        meal: MealType,
        #[command(flatten)]
        session: SessionArgs,
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Print the report as JSON
        #[arg(short = 'r', long)]
        raw: bool,
    },
    /// Convert an amount between units
    ///
    /// Same-group conversions (volume, mass, count) always work. With
    /// --ingredient, conversions across groups bridge through that
    /// ingredient's factors from the --conversions table.
    Convert {
        /// Amount to convert (decimal or cooking fraction, e.g. 1.5 or "1 1/2")
        #[arg(value_parser = parse_amount)]
        amount: f64,
        /// Unit to convert from (aliases like "tablespoons" are accepted)
        from: String,
        /// Unit to convert to
        to: String,
        /// Ingredient id used for cross-group bridging
        #[arg(long)]
        ingredient: Option<String>,
        /// Per-ingredient conversion table (JSON keyed by ingredient id)
        #[arg(long, value_name = "FILE")]
        conversions: Option<PathBuf>,
    },
    /// Start HTTP REST API server (default: localhost:3000)
    ///
    /// Serves the loaded recipes over HTTP.
    /// API: GET /recipes, POST /render/{id} with {multiplier, selectedOptions, restrictions, ...}
    Server {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port number to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Commands::Server { .. } => "larder=info,tower_http=info",
        _ => "larder=warn",
    };
    init_logging(default_filter);

    let result = match &cli.command {
        Commands::Run {
            recipe,
            session,
            unit,
            workspace,
            raw,
            interactive,
        } => run_command(workspace, recipe.as_ref(), session, unit, *raw, *interactive),
        Commands::Show { recipe, workspace } => show_command(workspace, recipe),
        Commands::List { root } => list_command(root),
        Commands::Nutrition {
            recipe,
            meal,
            session,
            workspace,
            raw,
        } => nutrition_command(workspace, recipe, *meal, session, *raw),
        Commands::Convert {
            amount,
            from,
            to,
            ingredient,
            conversions,
        } => convert_command(*amount, from, to, ingredient.as_deref(), conversions.as_deref()),
        Commands::Server {
            workspace,
            host,
            port,
        } => server_command(workspace, host, *port),
    };

    if let Err(e) = result {
        if let Some(larder_err) = e.downcast_ref::<larder::LarderError>() {
            eprintln!("{}", error_formatter::format_error(larder_err));
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

/// Structured logs go to stderr so stdout stays pipeable
fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(
    workspace: &WorkspaceArgs,
    recipe: Option<&String>,
    session: &SessionArgs,
    units: &[(String, String)],
    raw: bool,
    interactive: bool,
) -> Result<()> {
    let engine = load_engine(workspace)?;

    let id = match recipe {
        Some(id) => id.clone(),
        None if interactive => interactive::select_recipe(&engine)?,
        None => {
            eprintln!("Error: No recipe specified\n");
            eprintln!("Usage: larder run <RECIPE> [OPTIONS]\n");
            eprintln!("Examples:");
            eprintln!("  larder run pancakes                      - Render at the base batch size");
            eprintln!("  larder run pancakes -m 2                 - Double the batch");
            eprintln!("  larder run pancakes --restrict egg-free  - Swap in egg-free options");
            eprintln!("  larder run pancakes -c milk=oat          - Pick an option for a choice");
            eprintln!("  larder run --interactive                 - Interactive mode for selection\n");
            eprintln!("To see available recipes:");
            eprintln!("  larder list");
            std::process::exit(1);
        }
    };

    let mut state = start_session(&engine, &id, session)?;
    for (token, unit) in units {
        state.prefer_unit(token.as_str(), unit.as_str());
    }
    if interactive {
        interactive::prompt_session(&engine, &id, &mut state)?;
    }

    let rendered = engine.render(&id, &mut state)?;
    let formatter = Formatter::default();
    print!("{}", formatter.format_recipe(&rendered, raw));

    Ok(())
}

fn show_command(workspace: &WorkspaceArgs, id: &str) -> Result<()> {
    let engine = load_engine(workspace)?;
    let recipe = engine.get_recipe(id)?;
    let statuses = engine.restriction_statuses(id)?;

    let formatter = Formatter::default();
    print!("{}", formatter.format_recipe_inspection(recipe, &statuses));

    Ok(())
}

fn list_command(root: &Path) -> Result<()> {
    let mut engine = Engine::new();

    println!("Loading workspace from {}...", root.display());
    let file_count = load_workspace(&mut engine, root, &[])?;

    let recipes: Vec<&larder::Recipe> = engine
        .list_recipes()
        .iter()
        .filter_map(|id| engine.get_recipe(id).ok())
        .collect();

    println!();
    let formatter = Formatter::default();
    print!("{}", formatter.format_workspace_summary(file_count, &recipes));

    Ok(())
}

fn nutrition_command(
    workspace: &WorkspaceArgs,
    id: &str,
    meal: MealType,
    session: &SessionArgs,
    raw: bool,
) -> Result<()> {
    let engine = load_engine(workspace)?;
    let mut state = start_session(&engine, id, session)?;
    let report = engine.nutrition_report(id, &mut state, meal)?;

    if raw {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let formatter = Formatter::default();
        print!("{}", formatter.format_nutrition(id, meal, &report));
    }

    Ok(())
}

fn convert_command(
    amount: f64,
    from: &str,
    to: &str,
    ingredient: Option<&str>,
    conversions: Option<&Path>,
) -> Result<()> {
    let mut converter = Converter::standard();
    if let Some(path) = conversions {
        load_conversions(&mut converter, path)?;
    }

    let converted = match ingredient {
        Some(id) => converter.convert_for_ingredient(amount, from, to, id),
        None => converter.convert_unit_amount(amount, from, to),
    };

    match converted {
        Some(converted) => {
            let formatter = Formatter::default();
            println!(
                "{}",
                formatter.format_conversion(amount, from, &converted, converter.registry())
            );
            Ok(())
        }
        None => match ingredient {
            Some(id) => anyhow::bail!(
                "Cannot convert {} to {} for ingredient '{}' (no usable conversion factors)",
                from,
                to,
                id
            ),
            None => anyhow::bail!(
                "Cannot convert {} to {} (different unit groups; try --ingredient)",
                from,
                to
            ),
        },
    }
}

fn server_command(workspace: &WorkspaceArgs, host: &str, port: u16) -> Result<()> {
    #[cfg(feature = "server")]
    {
        use tokio::runtime::Runtime;
        let rt = Runtime::new()?;
        rt.block_on(async {
            let engine = load_engine(workspace)?;

            println!(
                "Starting HTTP server with {} recipe(s) loaded",
                engine.list_recipes().len()
            );
            server::http::start_server(engine, host, port).await
        })?;
    }

    #[cfg(not(feature = "server"))]
    {
        let _ = (workspace, host, port);
        eprintln!("Error: Server feature not enabled");
        eprintln!("Recompile with: cargo build --features server");
        std::process::exit(1);
    }

    Ok(())
}

/// Engine with the workspace recipes, optional conversions and optional config
fn load_engine(workspace: &WorkspaceArgs) -> Result<Engine> {
    let mut converter = Converter::standard();
    if let Some(path) = &workspace.conversions {
        load_conversions(&mut converter, path)?;
    }

    let config = match &workspace.config {
        Some(path) => {
            let source_id = path.to_string_lossy().to_string();
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            EngineConfig::from_json(&text, &source_id)?
        }
        None => EngineConfig::default(),
    };

    let mut engine = Engine::new().with_converter(converter).with_config(config);

    let data_files: Vec<PathBuf> = [&workspace.conversions, &workspace.config]
        .into_iter()
        .flatten()
        .filter_map(|p| p.canonicalize().ok())
        .collect();
    load_workspace(&mut engine, &workspace.workdir, &data_files)?;

    Ok(engine)
}

fn load_conversions(converter: &mut Converter, path: &Path) -> Result<()> {
    let source_id = path.to_string_lossy().to_string();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read conversions {}", path.display()))?;
    let count = converter.load_conversions_json(&text, &source_id)?;
    debug!(count, source = %source_id, "loaded ingredient conversions");
    Ok(())
}

/// Load every .json file under `workdir` as a recipe, skipping `skip`
///
/// Returns the number of files loaded.
fn load_workspace(engine: &mut Engine, workdir: &Path, skip: &[PathBuf]) -> Result<usize> {
    let mut file_count = 0;
    for entry in WalkDir::new(workdir) {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Ok(canonical) = path.canonicalize() {
            if skip.contains(&canonical) {
                continue;
            }
        }
        let source_id = path.to_string_lossy().to_string();
        engine.add_recipe_json(&fs::read_to_string(path)?, &source_id)?;
        file_count += 1;
    }

    Ok(file_count)
}

/// Fresh session for `id` with the command-line overrides applied
fn start_session(engine: &Engine, id: &str, args: &SessionArgs) -> Result<RenderState> {
    let recipe = engine.get_recipe(id)?;
    let mut state = engine.new_session(id)?;

    if let Some(multiplier) = args.multiplier {
        state.multiplier = multiplier;
    }
    if let Some((from, to)) = args.pan {
        if !state.set_pan(from, to) {
            warn!(%from, %to, "pan sizes have no usable area ratio, keeping the batch size");
        }
    }
    for (token, option) in &args.choose {
        let data = recipe
            .ingredients
            .get(token)
            .filter(|d| d.is_choice)
            .with_context(|| format!("Recipe '{}' has no choice token '{}'", id, token))?;
        if data.member(option).is_none() {
            let keys: Vec<&str> = data.choice_members().map(|o| o.option_key.as_str()).collect();
            anyhow::bail!(
                "Choice '{}' has no option '{}'. Expected one of: {}",
                token,
                option,
                keys.join(", ")
            );
        }
        state.select(token.as_str(), option.as_str());
    }
    for restriction in &args.restrict {
        state.set_restriction(*restriction, true);
    }

    Ok(state)
}

fn parse_multiplier(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(m) if m.is_finite() && m > 0.0 => Ok(m),
        _ => Err(format!("Invalid multiplier '{}': expected a positive number", s)),
    }
}

fn parse_pan(s: &str) -> Result<(PanSize, PanSize), String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid pan change '{}': expected FROM:TO", s))?;
    Ok((from.parse::<PanSize>()?, to.parse::<PanSize>()?))
}

fn parse_amount(s: &str) -> Result<f64, String> {
    if let Some(fraction) = larder::parse_ratio(s) {
        return Ok(fraction.to_f64());
    }
    match s.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(format!("Invalid amount '{}'", s)),
    }
}

/// Parse "key=value" into its two halves
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("Invalid value '{}': expected key=value", s)),
    }
}
