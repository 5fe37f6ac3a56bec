//! Explain command implementation

use colored::Colorize;
use manifest_core::Session;
use serde_json::json;

use crate::cli::{NodeArgs, Target};
use crate::context::{Workspace, resolve_node};
use crate::error::Result;

/// Run the explain command
pub fn run_explain(target: &Target, node_args: &NodeArgs, json: bool) -> Result<()> {
    let workspace = Workspace::load(target)?;
    let session = workspace.session()?;
    let (path, node) = resolve_node(&session, node_args)?;

    let explanation = session.explain(node);
    let declaration = session.declaration(node);
    let can_remove = session.can_remove(node);

    if json {
        let entries: Vec<_> = explanation
            .entries
            .iter()
            .map(|entry| {
                json!({
                    "action": entry.action_type,
                    "label": session.label(&entry.location),
                    "location": entry.location.to_string(),
                    "reason": entry.reason,
                })
            })
            .collect();
        let output = json!({
            "node": path.to_string(),
            "entries": entries,
            "merge_failed": explanation.merge_failed,
            "declaration": declaration.map(|location| location.to_string()),
            "can_remove": can_remove,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", path.to_string().bold());
    if explanation.merge_failed {
        println!(
            "{} the merge reported errors, this history may be incomplete",
            "!".yellow().bold()
        );
    }
    println!();

    if explanation.entries.is_empty() {
        println!("  {}", "No merge records for this node".dimmed());
    }
    for entry in &explanation.entries {
        print_entry(
            &session,
            &entry.action_type.to_string(),
            &entry.location,
            entry.reason.as_deref(),
        );
    }
    println!();

    match &declaration {
        Some(location) => println!("{}: {}", "Declared at".dimmed(), location),
        None => println!("{}: {}", "Declared at".dimmed(), "unknown".yellow()),
    }
    let removable = if can_remove { "yes".green() } else { "no".yellow() };
    println!("{}:   {}", "Removable".dimmed(), removable);
    Ok(())
}

fn print_entry(
    session: &Session<'_>,
    action: &str,
    location: &manifest_core::SourceFilePosition,
    reason: Option<&str>,
) {
    let label = session.label(location);
    print!("  {:<10} {}  {}", action.cyan(), label.bold(), location.to_string().dimmed());
    match reason {
        Some(reason) => println!("  {}", reason),
        None => println!(),
    }
}
