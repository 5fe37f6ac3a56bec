//! Remove and override command implementations

use manifest_core::EditOperation;

use super::print_outcome;
use crate::cli::{NodeArgs, Target};
use crate::context::{Workspace, resolve_node};
use crate::error::{CliError, Result};

/// Run the remove command
pub fn run_remove(target: &Target, node_args: &NodeArgs, force: bool) -> Result<()> {
    let workspace = Workspace::load(target)?;
    let session = workspace.session()?;
    let (path, node) = resolve_node(&session, node_args)?;

    if !force && !session.can_remove(node) {
        return Err(CliError::user(format!(
            "'{path}' does not come from another manifest; edit {} directly or pass --force",
            session.primary_manifest()
        )));
    }

    let outcome = session.edit(node, EditOperation::Remove)?;
    print_outcome(&outcome);
    Ok(())
}

/// Run the override command
pub fn run_override(target: &Target, node_args: &NodeArgs, name: &str, value: &str) -> Result<()> {
    let workspace = Workspace::load(target)?;
    let session = workspace.session()?;
    let (_, node) = resolve_node(&session, node_args)?;

    let operation = EditOperation::AddOverride {
        name: name.to_string(),
        value: value.to_string(),
    };
    let outcome = session.edit(node, operation)?;
    print_outcome(&outcome);
    Ok(())
}
