//! Suggest command implementation

use colored::Colorize;
use serde_json::json;

use super::print_outcome;
use crate::cli::Target;
use crate::context::Workspace;
use crate::error::{CliError, Result};

/// Run the suggest command. Suggestions are numbered from 1.
pub fn run_suggest(target: &Target, apply: Option<usize>, json: bool) -> Result<()> {
    let workspace = Workspace::load(target)?;
    let session = workspace.session()?;
    let suggestions = session.suggestions();

    if let Some(number) = apply {
        let (suggestion, record) = number
            .checked_sub(1)
            .and_then(|index| suggestions.get(index))
            .ok_or_else(|| {
                CliError::user(format!(
                    "no suggestion {number}, there are {}",
                    suggestions.len()
                ))
            })?;
        let outcome = session.apply_suggestion(suggestion, &record.location)?;
        print_outcome(&outcome);
        return Ok(());
    }

    if json {
        let output: Vec<_> = suggestions
            .iter()
            .enumerate()
            .map(|(index, (suggestion, record))| {
                json!({
                    "number": index + 1,
                    "suggestion": suggestion.describe(),
                    "message": record.message,
                    "location": record.location.to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let errors = session.merge_errors();
    if errors.is_empty() {
        println!("{}", "The merge reported no errors".green());
        return Ok(());
    }
    println!("{}:", "Merge Errors".bold());
    for record in &errors {
        println!("  {} {}  {}", "x".red(), record.message, record.location.to_string().dimmed());
    }
    println!();

    println!("{}:", "Suggestions".bold());
    if suggestions.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for (index, (suggestion, _)) in suggestions.iter().enumerate() {
        println!("  {}. {}", index + 1, suggestion.describe());
    }
    if !suggestions.is_empty() {
        println!();
        println!("Run with {} to apply one.", "--apply <N>".cyan());
    }
    Ok(())
}
