//! True origin of a merge record
//!
//! When a module depends on another module, the merger consumes that
//! dependency's already-merged manifest, so a record may point into an
//! intermediate file rather than the manifest somebody wrote. The resolver
//! follows such records into the dependency's own snapshot, finds the node
//! at the recorded position, and continues with that node's first record
//! until the location lands in the module being asked about, or cannot be
//! followed any further.

use crate::actions::Record;
use crate::graph::{ModuleGraph, ModuleId, SnapshotSupplier};
use crate::location::SourceFilePosition;

/// Outcome of following a record across modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub location: SourceFilePosition,
    /// Modules entered, in order.
    pub hops: Vec<ModuleId>,
    /// The depth guard stopped resolution early.
    pub truncated: bool,
}

pub struct ActionLocationResolver<'a> {
    graph: &'a dyn ModuleGraph,
    snapshots: &'a dyn SnapshotSupplier,
    max_depth: usize,
}

impl<'a> ActionLocationResolver<'a> {
    /// A resolver that allows at most one hop per module in the graph.
    pub fn new(graph: &'a dyn ModuleGraph, snapshots: &'a dyn SnapshotSupplier) -> Self {
        Self {
            graph,
            snapshots,
            max_depth: graph.module_count(),
        }
    }

    /// Replace the depth guard. `None` keeps the graph-size default.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        if let Some(depth) = max_depth {
            self.max_depth = depth;
        }
        self
    }

    pub fn resolve(&self, record: &Record, current: &ModuleId) -> SourceFilePosition {
        self.resolve_detailed(record, current).location
    }

    pub fn resolve_detailed(&self, record: &Record, current: &ModuleId) -> Resolution {
        let mut location = record.location.clone();
        let mut module = current.clone();
        let mut hops = Vec::new();

        loop {
            let (Some(file), Some(position)) = (&location.file, location.position) else {
                break;
            };
            let Some(owner) = self.graph.owning_module(file) else {
                break;
            };
            if owner == module {
                break;
            }
            if hops.len() >= self.max_depth {
                tracing::warn!(
                    location = %location,
                    depth = hops.len(),
                    "module resolution depth exceeded, keeping last known location"
                );
                return Resolution {
                    location,
                    hops,
                    truncated: true,
                };
            }

            let Some(snapshot) = self.snapshots.snapshot(&owner) else {
                tracing::warn!(module = %owner, "no merged manifest for module, keeping location");
                break;
            };
            let Some(node) = snapshot
                .document()
                .node_at(position.start_line, position.start_column)
            else {
                tracing::warn!(
                    module = %owner,
                    location = %location,
                    "no node at recorded position"
                );
                break;
            };
            let Some(next) = snapshot.records_for(node).first().map(|r| r.location.clone()) else {
                tracing::warn!(module = %owner, location = %location, "node has no merge records");
                break;
            };

            tracing::debug!(
                from = %location,
                to = %next,
                module = %owner,
                "following record into module"
            );
            location = next;
            module = owner;
            hops.push(module.clone());
        }

        Resolution {
            location,
            hops,
            truncated: false,
        }
    }
}
