//! Source checksums for staleness detection
//!
//! A merge report records one `sha256:<hex>` checksum per source manifest.
//! Comparing it with the file on disk tells whether the report still
//! describes the sources.

use crate::error::{Error, Result};
use crate::path::NormalizedPath;
use sha2::{Digest, Sha256};

const PREFIX: &str = "sha256:";

fn checksum_bytes(bytes: &[u8]) -> String {
    format!("{PREFIX}{:x}", Sha256::digest(bytes))
}

/// Checksum of manifest text as it will be written.
pub fn compute_content_checksum(content: &str) -> String {
    checksum_bytes(content.as_bytes())
}

/// Checksum of the manifest currently on disk.
pub fn compute_file_checksum(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let bytes = std::fs::read(&native).map_err(|e| Error::io(native, e))?;
    Ok(checksum_bytes(&bytes))
}

/// True when `path` no longer matches `recorded`. A missing or unreadable
/// file counts as changed.
pub fn has_changed(path: &NormalizedPath, recorded: &str) -> bool {
    match compute_file_checksum(path) {
        Ok(current) => current != recorded,
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "recorded source is unreadable");
            true
        }
    }
}
