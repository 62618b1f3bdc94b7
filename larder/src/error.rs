use std::sync::Arc;
use thiserror::Error;

/// Location and source text of a document that failed to deserialize
#[derive(Debug, Clone)]
pub struct ParseDetails {
    pub message: String,
    pub source_id: String,
    pub source_text: Arc<str>,
    /// 1-based line reported by the JSON reader
    pub line: usize,
    /// 1-based column reported by the JSON reader
    pub column: usize,
}

impl ParseDetails {
    /// Byte offset of `line`/`column` inside the source text
    pub fn offset(&self) -> usize {
        let mut offset = 0;
        for (index, text) in self.source_text.split_inclusive('\n').enumerate() {
            if index + 1 == self.line {
                return offset + self.column.saturating_sub(1).min(text.len());
            }
            offset += text.len();
        }
        self.source_text.len()
    }
}

/// Error types for the larder engine
///
/// Computational paths never produce these: fractions, conversions and
/// nutrition lookups degrade to absence markers instead. Errors are reserved
/// for unreadable documents and upstream contract violations.
#[derive(Debug, Clone, Error)]
pub enum LarderError {
    /// A recipe, unit table, conversion table or config document failed to deserialize
    #[error("Parse error: {} at {}:{}:{}", .0.message, .0.source_id, .0.line, .0.column)]
    Parse(Box<ParseDetails>),

    #[error("Recipe '{0}' not found")]
    UnknownRecipe(String),

    /// A token is referenced but has no ingredient entry
    #[error("Recipe '{recipe}' has no ingredient entry for token '{token}'")]
    UnknownToken { recipe: String, token: String },

    #[error("Token '{token}' in recipe '{recipe}' depends on unknown token '{depends_on}'")]
    UnknownDependency {
        recipe: String,
        token: String,
        depends_on: String,
    },

    /// Dependency chains deeper than one level are flagged rather than resolved
    #[error(
        "Token '{token}' in recipe '{recipe}' depends on '{controller}', which is itself dependent"
    )]
    NestedDependency {
        recipe: String,
        token: String,
        controller: String,
    },

    #[error("Contract violation in '{recipe}': {message}")]
    Contract { recipe: String, message: String },

    #[error("{}", format_multiple(.0))]
    MultipleErrors(Vec<LarderError>),
}

impl LarderError {
    /// Wrap a serde_json error together with the text it was reading
    pub fn parse(
        err: &serde_json::Error,
        source_id: impl Into<String>,
        source_text: impl Into<Arc<str>>,
    ) -> Self {
        Self::Parse(Box::new(ParseDetails {
            message: strip_location(&err.to_string()),
            source_id: source_id.into(),
            source_text: source_text.into(),
            line: err.line(),
            column: err.column(),
        }))
    }

    pub fn contract(recipe: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Contract {
            recipe: recipe.into(),
            message: message.into(),
        }
    }

    /// Collapse a list of errors, keeping a lone error unwrapped
    pub fn collect(mut errors: Vec<LarderError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::MultipleErrors(errors)),
        }
    }
}

// serde_json appends " at line X column Y"; the location is kept separately
fn strip_location(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(pos) => message[..pos].to_string(),
        None => message.to_string(),
    }
}

fn format_multiple(errors: &[LarderError]) -> String {
    let mut out = String::from("Multiple errors:");
    for (i, error) in errors.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, error));
    }
    out
}
