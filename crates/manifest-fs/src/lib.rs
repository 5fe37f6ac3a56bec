//! Filesystem layer for manifest provenance
//!
//! Provides the path type used as the identity of every manifest file,
//! locked atomic writes for source edits, and content checksums.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_content_checksum, compute_file_checksum, has_changed};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
