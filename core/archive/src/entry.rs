//! Archive entry types and the record-stream codec.
//!
//! An archive is an ordered sequence of entries serialized as a flat byte
//! stream. Order matters: pack emits parents before their children so that
//! a well-formed archive unpacks directories before the files inside them.
//!
//! # Stream layout (version 1)
//!
//! ```text
//! magic "varc" (4) | version (1)
//! then per entry:
//! path_len u16 LE | path bytes (UTF-8, '/'-separated) | kind (1)
//! mode u32 LE | content_len u64 LE | content bytes
//! ```
//!
//! Directories carry a zero-length content field.

use serde::{Deserialize, Serialize};

use vaultpack_common::{Error, Result};

/// Magic bytes identifying an archive stream.
pub const MAGIC: [u8; 4] = *b"varc";

/// Current archive format version.
pub const VERSION: u8 = 1;

/// Kind of filesystem entry stored in an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file with content bytes.
    File,
    /// Directory; content is always empty.
    Directory,
}

impl EntryKind {
    /// Stable wire identifier for this kind.
    pub fn as_byte(self) -> u8 {
        match self {
            Self::File => 0,
            Self::Directory => 1,
        }
    }

    /// Look up a kind by its wire identifier.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::File),
            1 => Some(Self::Directory),
            _ => None,
        }
    }
}

/// A single packed filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Relative, slash-separated path within the archive.
    pub path: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Permission bits as recorded at pack time.
    pub mode: u32,
    /// File content; empty for directories.
    pub content: Vec<u8>,
}

/// Summary of an entry, as returned by listing and unpacking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    /// Relative, slash-separated path within the archive.
    pub path: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Permission bits.
    pub mode: u32,
    /// Content size in bytes; 0 for directories.
    pub size: u64,
}

impl From<&ArchiveEntry> for EntrySummary {
    fn from(entry: &ArchiveEntry) -> Self {
        Self {
            path: entry.path.clone(),
            kind: entry.kind,
            mode: entry.mode,
            size: entry.content.len() as u64,
        }
    }
}

/// Serialize entries into a single archive byte stream.
///
/// # Errors
/// - `InvalidInput` if an entry path exceeds the u16 length field
pub fn encode_entries(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let mut stream = Vec::with_capacity(
        MAGIC.len() + 1 + entries.iter().map(|e| 15 + e.path.len() + e.content.len()).sum::<usize>(),
    );
    stream.extend_from_slice(&MAGIC);
    stream.push(VERSION);

    for entry in entries {
        let path = entry.path.as_bytes();
        if path.len() > u16::MAX as usize {
            return Err(Error::InvalidInput(format!(
                "Entry path too long: {} bytes",
                path.len()
            )));
        }
        stream.extend_from_slice(&(path.len() as u16).to_le_bytes());
        stream.extend_from_slice(path);
        stream.push(entry.kind.as_byte());
        stream.extend_from_slice(&entry.mode.to_le_bytes());
        stream.extend_from_slice(&(entry.content.len() as u64).to_le_bytes());
        stream.extend_from_slice(&entry.content);
    }

    Ok(stream)
}

/// Parse an archive byte stream back into entries.
///
/// Performs structural validation only; path safety is enforced by
/// unpacking, which treats the decoded paths as untrusted.
///
/// # Errors
/// - `MalformedBlob` on bad magic, unknown version, truncated records,
///   non-UTF-8 paths, or unknown entry kinds
pub fn decode_entries(stream: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut input = stream;

    let magic = take(&mut input, MAGIC.len())?;
    if magic != MAGIC {
        return Err(Error::MalformedBlob("Bad archive magic bytes".to_string()));
    }
    let version = take(&mut input, 1)?[0];
    if version != VERSION {
        return Err(Error::MalformedBlob(format!(
            "Unsupported archive version: {}",
            version
        )));
    }

    let mut entries = Vec::new();
    while !input.is_empty() {
        let path_len = u16::from_le_bytes(take(&mut input, 2)?.try_into().unwrap()) as usize;
        let path = std::str::from_utf8(take(&mut input, path_len)?)
            .map_err(|_| Error::MalformedBlob("Entry path is not valid UTF-8".to_string()))?
            .to_string();
        let kind_byte = take(&mut input, 1)?[0];
        let kind = EntryKind::from_byte(kind_byte).ok_or_else(|| {
            Error::MalformedBlob(format!("Unknown entry kind: {}", kind_byte))
        })?;
        let mode = u32::from_le_bytes(take(&mut input, 4)?.try_into().unwrap());
        let content_len = u64::from_le_bytes(take(&mut input, 8)?.try_into().unwrap());
        if content_len > input.len() as u64 {
            return Err(Error::MalformedBlob("Entry content truncated".to_string()));
        }
        let content = take(&mut input, content_len as usize)?.to_vec();

        entries.push(ArchiveEntry {
            path,
            kind,
            mode,
            content,
        });
    }

    Ok(entries)
}

/// Split `n` bytes off the front of the input.
fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if input.len() < n {
        return Err(Error::MalformedBlob("Archive record truncated".to_string()));
    }
    let (head, rest) = input.split_at(n);
    *input = rest;
    Ok(head)
}
