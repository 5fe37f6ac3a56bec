//! Command implementations for manifest-cli

pub mod edit;
pub mod explain;
pub mod files;
pub mod suggest;

pub use edit::{run_override, run_remove};
pub use explain::run_explain;
pub use files::run_files;
pub use suggest::run_suggest;

use colored::Colorize;
use manifest_core::EditOutcome;

/// Report what an edit did to the primary manifest.
pub(crate) fn print_outcome(outcome: &EditOutcome) {
    let edit = &outcome.edit;
    if !outcome.written {
        println!(
            "{} {}=\"{}\" already present in {}",
            "=".dimmed(),
            edit.attribute.cyan(),
            edit.value,
            outcome.file
        );
        return;
    }
    for segment in &edit.created {
        println!("{} created <{}>", "+".green(), segment.to_string().cyan());
    }
    println!(
        "{} {}=\"{}\" written to {}",
        "+".green(),
        edit.attribute.cyan(),
        edit.value,
        outcome.file
    );
}
