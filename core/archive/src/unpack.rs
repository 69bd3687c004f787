//! Unpacking an archive stream, with hostile-input path validation.
//!
//! The byte stream is untrusted once decrypted: every entry path is
//! validated before the first disk write, so a malicious archive cannot
//! cause a partial extraction.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::entry::{decode_entries, ArchiveEntry, EntryKind, EntrySummary};
use vaultpack_common::{Error, Result};

/// Unpack an archive stream under a destination root.
///
/// With `materialize` false this is a pure listing: entry summaries are
/// returned and nothing on disk is created or modified. With
/// `materialize` true, directories are created (missing parents included,
/// without trusting pack-time ordering), file contents written, and
/// recorded permission bits applied.
///
/// Every entry path is validated up front; any unsafe path aborts the
/// whole operation before a single write. A mid-extraction I/O failure
/// leaves already-written entries on disk; there is no rollback.
///
/// # Errors
/// - `MalformedBlob` if the stream cannot be parsed
/// - `UnsafePath` if any entry is absolute, contains a `..` segment, or
///   would otherwise escape the destination root
/// - `Io` if a write fails while materializing
pub fn unpack_files(
    stream: &[u8],
    destination: &Path,
    materialize: bool,
) -> Result<Vec<EntrySummary>> {
    let entries = decode_entries(stream)?;

    for entry in &entries {
        validate_entry_path(&entry.path)?;
    }

    let summaries: Vec<EntrySummary> = entries.iter().map(EntrySummary::from).collect();

    if !materialize {
        return Ok(summaries);
    }

    fs::create_dir_all(destination).map_err(|e| Error::io(destination, e))?;
    for entry in &entries {
        write_entry(destination, entry)?;
    }

    Ok(summaries)
}

/// Reject any entry path that could land outside the destination root.
///
/// Paths must be non-empty, relative, slash-separated, and free of `..`,
/// `.`, empty segments, backslashes, and NUL bytes.
fn validate_entry_path(path: &str) -> Result<()> {
    let unsafe_path = || Error::UnsafePath {
        path: path.to_string(),
    };

    if path.is_empty() || path.starts_with('/') {
        return Err(unsafe_path());
    }
    if path.contains('\\') || path.contains('\0') {
        return Err(unsafe_path());
    }
    // Catches non-slash absolute forms such as Windows drive prefixes.
    if Path::new(path).is_absolute() {
        return Err(unsafe_path());
    }
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(unsafe_path());
        }
    }

    Ok(())
}

/// Materialize a single validated entry under the destination root.
fn write_entry(root: &Path, entry: &ArchiveEntry) -> Result<()> {
    let target = root.join(&entry.path);

    match entry.kind {
        EntryKind::Directory => {
            debug!(path = %entry.path, "unpacking directory");
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        }
        EntryKind::File => {
            debug!(path = %entry.path, size = entry.content.len(), "unpacking file");
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::write(&target, &entry.content).map_err(|e| Error::io(&target, e))?;
        }
    }

    set_mode(&target, entry.mode)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
