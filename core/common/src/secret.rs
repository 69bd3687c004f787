//! Secret byte buffers with guaranteed wiping.
//!
//! Every buffer that ever holds a passphrase, keyfile contents, or key
//! material must be zeroed once the operation that needed it has finished,
//! on every exit path. `Secret` ties the wipe to drop so no early return
//! can skip it; `wipe` covers caller-owned scratch buffers.

use std::fmt;
use zeroize::Zeroize;

/// Overwrite every byte of a caller-owned buffer with zero.
///
/// Uses a compiler-fenced store so the write cannot be optimized away.
/// Cannot fail.
pub fn wipe(buffer: &mut [u8]) {
    buffer.zeroize();
}

/// Combined user secret: optional keyfile bytes followed by the passphrase.
///
/// Ephemeral by contract: created at the start of a seal/open operation,
/// consumed by key derivation, and zeroized on drop. Never persisted.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Build the combined secret from a passphrase and optional keyfile.
    ///
    /// Keyfile bytes come first, passphrase appended. Both may be of any
    /// length, but the combination must not be empty.
    pub fn combine(passphrase: &[u8], keyfile: Option<&[u8]>) -> Self {
        let mut bytes = Vec::with_capacity(
            passphrase.len() + keyfile.map(<[u8]>::len).unwrap_or(0),
        );
        if let Some(keyfile) = keyfile {
            bytes.extend_from_slice(keyfile);
        }
        bytes.extend_from_slice(passphrase);
        Self(bytes)
    }

    /// Get a reference to the inner bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED; {} bytes])", self.0.len())
    }
}
