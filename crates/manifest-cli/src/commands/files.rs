//! Files command implementation

use colored::Colorize;

use crate::cli::Target;
use crate::context::Workspace;
use crate::error::Result;

/// Run the files command
pub fn run_files(target: &Target, json: bool) -> Result<()> {
    let workspace = Workspace::load(target)?;
    let session = workspace.session()?;
    let index = session.provenance_index();
    let files: Vec<_> = index
        .files()
        .iter()
        .map(|file| index.describe(file, workspace.graph()))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    println!("{}", "Contributing Manifests".bold());
    println!();
    for meta in &files {
        let marker = if meta.is_current { "*".green() } else { " ".normal() };
        let slot = meta.slot.map_or_else(|| "-".to_string(), |slot| slot.to_string());
        let line = format!("{marker} {slot:>2}  {:<24} {}", meta.label, meta.file);
        if meta.is_project_file {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!();
    println!(
        "{} referenced, {} other",
        index.referenced().len(),
        index.others().len()
    );
    Ok(())
}
