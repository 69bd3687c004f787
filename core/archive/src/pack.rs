//! Packing filesystem paths into an archive stream.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::entry::{encode_entries, ArchiveEntry, EntryKind};
use vaultpack_common::{Error, Result};

/// Pack files and directories into a single archive byte stream.
///
/// Each input path is stored under its own basename; directories recurse
/// into their children in lexicographic order, parent before child.
/// Packing is all-or-nothing: the first error discards everything built
/// so far.
///
/// # Errors
/// - `Io` if an input path does not exist or cannot be read
/// - `UnsupportedEntryType` on symlinks and special files; silently
///   skipping them would produce a partial backup
/// - `InvalidInput` on paths with no usable name or non-UTF-8 names
pub fn pack_files(paths: &[impl AsRef<Path>]) -> Result<Vec<u8>> {
    let mut entries = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Cannot determine archive name for path: {}",
                    path.display()
                ))
            })?;
        add_entry(&mut entries, path, name.to_string())?;
    }

    encode_entries(&entries)
}

/// Recursively add one filesystem entry under the given archive path.
fn add_entry(entries: &mut Vec<ArchiveEntry>, fs_path: &Path, archive_path: String) -> Result<()> {
    let meta = fs::symlink_metadata(fs_path).map_err(|e| Error::io(fs_path, e))?;
    let file_type = meta.file_type();

    if !file_type.is_file() && !file_type.is_dir() {
        return Err(Error::UnsupportedEntryType {
            path: fs_path.to_path_buf(),
        });
    }

    if file_type.is_dir() {
        debug!(path = %archive_path, "packing directory");
        entries.push(ArchiveEntry {
            path: archive_path.clone(),
            kind: EntryKind::Directory,
            mode: mode_bits(&meta),
            content: Vec::new(),
        });

        let mut children: Vec<_> = fs::read_dir(fs_path)
            .map_err(|e| Error::io(fs_path, e))?
            .collect::<std::io::Result<_>>()
            .map_err(|e| Error::io(fs_path, e))?;
        children.sort_by_key(|child| child.file_name());

        for child in children {
            let child_name = child.file_name().into_string().map_err(|_| {
                Error::InvalidInput(format!(
                    "Non-UTF-8 file name under: {}",
                    fs_path.display()
                ))
            })?;
            add_entry(
                entries,
                &child.path(),
                format!("{}/{}", archive_path, child_name),
            )?;
        }
    } else {
        debug!(path = %archive_path, size = meta.len(), "packing file");
        let content = fs::read(fs_path).map_err(|e| Error::io(fs_path, e))?;
        entries.push(ArchiveEntry {
            path: archive_path,
            kind: EntryKind::File,
            mode: mode_bits(&meta),
            content,
        });
    }

    Ok(())
}

/// Permission bits to record for an entry.
#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    if meta.is_dir() {
        0o755
    } else {
        0o644
    }
}
