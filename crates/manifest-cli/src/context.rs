//! Loading the project a command works on

use crate::cli::{NodeArgs, Target};
use crate::error::{CliError, Result};
use colored::Colorize;
use manifest_core::{
    ConfigResolver, Error, MergedManifestSnapshot, ModuleId, NodePath, ProjectGraph,
    ProvenanceConfig, Session, SnapshotCache, SnapshotSupplier,
};
use manifest_fs::NormalizedPath;
use manifest_xml::NodeRef;

/// The graph, snapshots and config behind one command.
pub struct Workspace {
    graph: ProjectGraph,
    snapshots: SnapshotCache,
    module: ModuleId,
    primary: NormalizedPath,
    config: ProvenanceConfig,
}

impl Workspace {
    pub fn load(target: &Target) -> Result<Self> {
        let graph_path = NormalizedPath::new(std::path::absolute(&target.graph)?);
        let graph = ProjectGraph::load(&graph_path)?;
        let module = ModuleId::new(&target.module);
        let primary = graph.primary_manifest(&module)?;

        let mut snapshots = graph.load_snapshots()?;
        if let Some(report) = &target.report {
            let snapshot = MergedManifestSnapshot::load(&NormalizedPath::new(report))?;
            snapshots.insert(module.clone(), snapshot);
        }

        let root = graph_path
            .parent()
            .unwrap_or_else(|| NormalizedPath::new("/"));
        let config = ConfigResolver::new(root).resolve()?;
        tracing::debug!(module = %module, primary = %primary, "loaded workspace");

        Ok(Self {
            graph,
            snapshots,
            module,
            primary,
            config,
        })
    }

    pub fn graph(&self) -> &ProjectGraph {
        &self.graph
    }

    /// A session on the module's snapshot. Warns on stderr when the
    /// snapshot predates the current sources.
    pub fn session(&self) -> Result<Session<'_>> {
        let snapshot = self
            .snapshots
            .snapshot(&self.module)
            .ok_or_else(|| Error::SnapshotUnavailable {
                module: self.module.to_string(),
            })?;
        if snapshot.is_stale() {
            eprintln!(
                "{}: sources changed since the last merge, results may be outdated",
                "warning".yellow().bold()
            );
        }
        Ok(Session::new(
            snapshot,
            self.module.clone(),
            self.primary.clone(),
            &self.graph,
            &self.snapshots,
        )
        .with_config(self.config.clone()))
    }
}

/// Parse `--path`/`--attr` and find the node in the merged document.
pub fn resolve_node(session: &Session<'_>, args: &NodeArgs) -> Result<(NodePath, NodeRef)> {
    let mut path = NodePath::parse(&args.path)?;
    if let Some(attr) = &args.attr {
        if path.attribute.as_ref().is_some_and(|existing| existing != attr) {
            return Err(CliError::user(format!(
                "path '{}' already names an attribute, drop --attr or the '@' suffix",
                args.path
            )));
        }
        path.attribute = Some(attr.clone());
    }
    let node = path.resolve(session.snapshot().document())?;
    Ok((path, node))
}
