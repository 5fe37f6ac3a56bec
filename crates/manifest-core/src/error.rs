//! Error types for manifest-core

use manifest_fs::NormalizedPath;

/// Result type for manifest-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in manifest-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source manifest could not be parsed; nothing was written
    #[error("Malformed manifest {path}: {source}")]
    MalformedSource {
        path: NormalizedPath,
        #[source]
        source: manifest_xml::Error,
    },

    /// The primary manifest does not share the merged document's root
    #[error("Ancestor path does not match the source manifest at segment {segment}")]
    AncestorPathMismatch { segment: String },

    /// A tools attribute name was given with a namespace prefix
    #[error("tools attribute name must not be namespaced: {name}")]
    NamespacedToolsAttribute { name: String },

    /// A merger suggestion that cannot be applied automatically
    #[error("Unsupported suggestion: {message}")]
    UnsupportedSuggestion { message: String },

    /// The element a suggestion points at is not the one it names
    #[error("Suggestion targets <{expected}> but found {found} at {line}:{column}")]
    SuggestionTargetMismatch {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },

    /// A node path string could not be parsed
    #[error("Invalid node path '{path}': {reason}")]
    InvalidNodePath { path: String, reason: String },

    /// A node path did not match any node in the merged document
    #[error("No node matches '{path}'")]
    NodeNotFound { path: String },

    /// A module id that the project graph does not know
    #[error("Unknown module: {module}")]
    UnknownModule { module: String },

    /// The module has no merge report to load
    #[error("No merged manifest snapshot for module {module}")]
    SnapshotUnavailable { module: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from manifest-fs
    #[error(transparent)]
    Fs(#[from] manifest_fs::Error),

    /// XML error from manifest-xml
    #[error(transparent)]
    Xml(#[from] manifest_xml::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
