//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Manifest Provenance - explain and edit Android merged manifests
#[derive(Parser, Debug)]
#[command(name = "manifest-prov")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Which merged manifest a command works on.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Project graph file (JSON, TOML or YAML)
    #[arg(short, long, env = "MANIFEST_PROV_GRAPH")]
    pub graph: PathBuf,

    /// Module whose merged manifest is inspected
    #[arg(short, long)]
    pub module: String,

    /// Merge report to use instead of the one named in the graph
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// A node in the merged manifest.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct NodeArgs {
    /// Node path, e.g. manifest/application/activity[.Main]@android:label
    #[arg(short, long)]
    pub path: String,

    /// Attribute of the node, when not given in the path
    #[arg(short, long)]
    pub attr: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show where a node or attribute came from
    ///
    /// Examples:
    ///   manifest-prov explain -g project.json -m app -p manifest/application
    ///   manifest-prov explain -g project.json -m app -p manifest/application -a android:label
    Explain {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        node: NodeArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List the manifest files that contributed to the merge
    Files {
        #[command(flatten)]
        target: Target,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Mark a node or attribute for removal in the primary manifest
    ///
    /// Writes tools:node="remove" or tools:remove="..." so the next merge
    /// drops it.
    Remove {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        node: NodeArgs,

        /// Write the marker even when the node is declared in the primary
        /// manifest itself
        #[arg(long)]
        force: bool,
    },

    /// Add a tools attribute to a node in the primary manifest
    ///
    /// Examples:
    ///   manifest-prov override -g project.json -m app -p manifest/uses-sdk --name overrideLibrary --value com.lib
    Override {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        node: NodeArgs,

        /// Tools attribute name, without prefix (e.g. replace)
        #[arg(short, long)]
        name: String,

        /// Attribute value
        #[arg(long)]
        value: String,
    },

    /// List merger suggestions and optionally apply one
    Suggest {
        #[command(flatten)]
        target: Target,

        /// Apply the suggestion with this number
        #[arg(long)]
        apply: Option<usize>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
