//! Locked, atomic I/O for manifest sources

use crate::{Error, NormalizedPath, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename so readers observe either the old or the
/// new content, never a partial file. Every call gets its own temp file.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();
    let parent = parent_dir(&native_path);
    fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

    // Same directory keeps the rename on one filesystem
    let mut temp_file = NamedTempFile::new_in(&parent).map_err(|e| Error::io(&parent, e))?;
    temp_file
        .write_all(content)
        .and_then(|()| temp_file.as_file().sync_all())
        .map_err(|e| Error::io(temp_file.path(), e))?;

    // Dropping the temp file on failure removes it
    temp_file
        .persist(&native_path)
        .map_err(|e| Error::io(&native_path, e.error))?;

    Ok(())
}

fn parent_dir(native_path: &Path) -> PathBuf {
    match native_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// The sidecar `.<name>.lock` that serializes edits of `native_path`.
/// Unlike the manifest, it is never replaced by rename.
fn lock_path(native_path: &Path) -> PathBuf {
    let name = native_path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    native_path.with_file_name(format!(".{name}.lock"))
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read-modify-write a file under an exclusive advisory lock.
///
/// `edit` receives the current content and returns a result value together
/// with the replacement content, or `None` to leave the file untouched. Any
/// error from `edit` aborts before anything is written. Returns the result
/// value and whether the file was rewritten.
pub fn edit_locked<F, T, E>(path: &NormalizedPath, edit: F) -> std::result::Result<(T, bool), E>
where
    F: FnOnce(&str) -> std::result::Result<(T, Option<String>), E>,
    E: From<Error>,
{
    let native_path = path.to_native();
    if !native_path.is_file() {
        return Err(Error::io(
            &native_path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        )
        .into());
    }

    let sidecar = lock_path(&native_path);
    let lock_file: File = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&sidecar)
        .map_err(|e| Error::io(&sidecar, e))?;

    lock_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    // Read only once the lock is held so an earlier editor's rename is visible
    let content = read_text(path)?;

    let (value, updated) = edit(&content)?;
    let Some(updated) = updated else {
        tracing::debug!(path = %path, "edit produced no change, leaving file untouched");
        return Ok((value, false));
    };

    write_atomic(path, updated.as_bytes())?;
    tracing::debug!(path = %path, bytes = updated.len(), "wrote edited file");

    // Lock released when lock_file is dropped
    Ok((value, true))
}
