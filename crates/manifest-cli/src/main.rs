//! Manifest Provenance CLI
//!
//! Explains where the nodes of an Android merged manifest came from and
//! writes `tools:` directives into a module's primary manifest.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let installed = if cli.verbose {
        logging::init_verbose()
    } else {
        logging::init()
    };
    installed.map_err(|e| CliError::user(format!("failed to set up logging: {e}")))?;

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Manifest Provenance CLI", "manifest-prov".green().bold());
            println!();
            println!("Run {} for available commands.", "manifest-prov --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Explain { target, node, json } => commands::run_explain(&target, &node, json),
        Commands::Files { target, json } => commands::run_files(&target, json),
        Commands::Remove {
            target,
            node,
            force,
        } => commands::run_remove(&target, &node, force),
        Commands::Override {
            target,
            node,
            name,
            value,
        } => commands::run_override(&target, &node, &name, &value),
        Commands::Suggest {
            target,
            apply,
            json,
        } => commands::run_suggest(&target, apply, json),
    }
}
