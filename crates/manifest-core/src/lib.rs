//! Provenance and reverse-mapped edits for merged Android manifests
//!
//! An external merger combines every manifest of a module, its source sets
//! and its dependencies into one document and logs why each node ended up
//! there. This crate reads that result back:
//!
//! - **Node keys**: derive the key the merger logged a node under
//! - **Location resolution**: follow records through dependency modules'
//!   own merges to the manifest somebody actually wrote
//! - **Provenance index**: order and label the files that contributed
//! - **Tools editing**: write `tools:node`, `tools:remove`, `tools:replace`
//!   and friends into the primary manifest, creating missing parent tags
//!
//! # Architecture
//!
//! ```text
//!                   manifest-cli
//!                        |
//!                  manifest-core
//!                        |
//!            +-----------+-----------+
//!            |                       |
//!       manifest-fs             manifest-xml
//! ```
//!
//! # Example
//!
//! ```ignore
//! use manifest_core::{NodePath, ProjectGraph, Session};
//!
//! let graph = ProjectGraph::load(&"project.json".into())?;
//! let snapshots = graph.load_snapshots()?;
//! let module = "app".into();
//! let snapshot = snapshots.snapshot(&module).unwrap();
//! let primary = graph.primary_manifest(&module)?;
//! let session = Session::new(snapshot, module, primary, &graph, &snapshots);
//!
//! let node = NodePath::parse("manifest/uses-sdk")?.resolve(session.snapshot().document())?;
//! for entry in session.explain(node).entries {
//!     println!("{} {}", entry.action_type, entry.location);
//! }
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod graph;
pub mod key;
pub mod location;
pub mod node_path;
pub mod provenance;
pub mod removal;
pub mod resolver;
pub mod session;
pub mod snapshot;
pub mod suggestion;
pub mod tools;

pub use actions::{ActionIndex, ActionType, Actions, Record};
pub use config::{ConfigResolver, ProvenanceConfig};
pub use error::{Error, Result};
pub use graph::{
    ManifestEntry, ModuleEntry, ModuleGraph, ModuleId, ProjectGraph, SnapshotCache,
    SnapshotSupplier,
};
pub use key::{KeyTable, NodeKey};
pub use location::SourceFilePosition;
pub use node_path::{NodePath, PathSegment};
pub use provenance::{ManifestFileWithMetadata, ProvenanceIndex};
pub use removal::{RemovalPlan, can_remove, plan_removal};
pub use resolver::{ActionLocationResolver, Resolution};
pub use session::{EditOperation, EditOutcome, ExplainEntry, Explanation, Session};
pub use snapshot::{LoggingRecord, MergedManifestSnapshot, Severity, SnapshotReport};
pub use suggestion::Suggestion;
pub use tools::{ToolsEdit, add_tools_attribute};
