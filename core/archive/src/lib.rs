//! Archive packing and unpacking for VaultPack.
//!
//! This module provides:
//! - A versioned record-stream format for files and directories
//! - Packing filesystem paths, preserving relative paths and mode bits
//! - Unpacking with listing mode and defensive path validation
//!
//! No compression is applied at this layer.

pub mod entry;
pub mod pack;
pub mod unpack;

pub use entry::{decode_entries, encode_entries, ArchiveEntry, EntryKind, EntrySummary};
pub use pack::pack_files;
pub use unpack::unpack_files;
