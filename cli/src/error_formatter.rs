use ariadne::{Color, Label, Report, ReportKind, Source};
use larder::LarderError;

/// Format a LarderError with fancy terminal output using Ariadne
pub fn format_error(error: &LarderError) -> String {
    match error {
        LarderError::Parse(details) => {
            let mut output = Vec::new();
            let offset = details.offset();
            let end = (offset + 1).min(details.source_text.len()).max(offset);

            let report = Report::build(ReportKind::Error, &details.source_id, offset)
                .with_message(format!(
                    "Parse error: {} (file {}:{}:{})",
                    details.message, details.source_id, details.line, details.column
                ))
                .with_label(
                    Label::new((&details.source_id, offset..end))
                        .with_message(&details.message)
                        .with_color(Color::Red),
                )
                .with_help("Recipe documents are JSON objects with id, tokenOrder and ingredients");

            match report.finish().write(
                (
                    &details.source_id,
                    Source::from(details.source_text.as_ref()),
                ),
                &mut output,
            ) {
                Ok(_) => String::from_utf8_lossy(&output).to_string(),
                Err(_) => format!("{}", error),
            }
        }
        LarderError::UnknownRecipe(id) => {
            format!("Recipe '{}' not found\n  Run `larder list` to see loaded recipes", id)
        }
        LarderError::UnknownToken { .. }
        | LarderError::UnknownDependency { .. }
        | LarderError::NestedDependency { .. } => format!("Invalid recipe: {}", error),
        LarderError::Contract { .. } => error.to_string(),
        LarderError::MultipleErrors(errors) => {
            let mut result = String::from("Multiple errors occurred:\n\n");
            for error in errors {
                result.push_str(&format_error(error));
                result.push_str("\n\n");
            }
            result
        }
    }
}
