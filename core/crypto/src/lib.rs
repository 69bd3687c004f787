//! Cryptographic primitives for VaultPack.
//!
//! This module provides:
//! - Key derivation using Argon2id with selectable cost presets
//! - Authenticated sealing/opening of archive blobs using XChaCha20-Poly1305
//! - Keyfile generation
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - A sealed blob authenticates its own header; any bit flip is rejected

pub mod kdf;
pub mod keyfile;
pub mod keys;
pub mod sealed;

pub use kdf::{derive_key, KdfPreset};
pub use keys::{ArchiveKey, Salt, KEY_LENGTH, SALT_LENGTH};
pub use sealed::{open, seal};
