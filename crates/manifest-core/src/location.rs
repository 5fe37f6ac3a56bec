//! File plus position of a merge record

use manifest_fs::NormalizedPath;
use manifest_xml::SourcePosition;
use serde::{Deserialize, Serialize};

/// Where a record says its node came from. Either half may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceFilePosition {
    #[serde(default)]
    pub file: Option<NormalizedPath>,
    #[serde(default)]
    pub position: Option<SourcePosition>,
}

impl SourceFilePosition {
    pub fn new(file: impl Into<NormalizedPath>, position: SourcePosition) -> Self {
        Self {
            file: Some(file.into()),
            position: Some(position),
        }
    }

    /// A known file with an unknown position.
    pub fn file_only(file: impl Into<NormalizedPath>) -> Self {
        Self {
            file: Some(file.into()),
            position: None,
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    /// Both file and position are known.
    pub fn is_resolvable(&self) -> bool {
        self.file.is_some() && self.position.is_some()
    }
}

impl std::fmt::Display for SourceFilePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.file, &self.position) {
            (Some(file), Some(position)) => write!(f, "{file}:{position}"),
            (Some(file), None) => write!(f, "{file}"),
            (None, Some(position)) => write!(f, "?:{position}"),
            (None, None) => f.write_str("?"),
        }
    }
}
