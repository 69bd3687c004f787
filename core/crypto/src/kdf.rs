//! Key derivation using Argon2id.
//!
//! Argon2id is a memory-hard password hashing function that provides
//! resistance to both GPU and time-memory trade-off attacks. The cost
//! preset travels with every sealed blob so a key derived here is always
//! reproducible on open.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::keys::{ArchiveKey, Salt, KEY_LENGTH};
use vaultpack_common::{Error, Result, Secret};

/// Selectable Argon2id cost preset.
///
/// Each preset maps to a fixed (memory, iterations, parallelism) triple.
/// The one-byte identifier is persisted in the blob header; changing a
/// preset's parameters would orphan every blob sealed under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfPreset {
    /// Default cost: 64 MiB memory, 3 iterations, 4 lanes.
    Standard,
    /// Reduced cost for constrained hardware: 32 MiB, 3 iterations, 2 lanes.
    ///
    /// Trades brute-force resistance for speed; ciphertext security
    /// (key, nonce, and tag sizes) is unchanged.
    Low,
}

impl KdfPreset {
    /// Stable wire identifier for this preset.
    pub fn id(self) -> u8 {
        match self {
            Self::Standard => 0,
            Self::Low => 1,
        }
    }

    /// Look up a preset by its wire identifier.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Standard),
            1 => Some(Self::Low),
            _ => None,
        }
    }

    /// The (memory KiB, iterations, parallelism) triple for this preset.
    pub fn cost(self) -> (u32, u32, u32) {
        match self {
            Self::Standard => (65536, 3, 4),
            Self::Low => (32768, 3, 2),
        }
    }
}

impl Default for KdfPreset {
    fn default() -> Self {
        Self::Standard
    }
}

/// Derive an archive key from a secret and salt using Argon2id.
///
/// # Preconditions
/// - `secret` must not be empty
///
/// # Postconditions
/// - The derived key is deterministic given the same (secret, salt, preset)
///
/// # Errors
/// - `InvalidInput` if the secret is empty
/// - `ResourceExhausted` if the host cannot supply the preset's memory
///
/// # Security
/// - The secret is not stored or logged
/// - The returned key zeroizes on drop
pub fn derive_key(secret: &Secret, salt: &Salt, preset: KdfPreset) -> Result<ArchiveKey> {
    if secret.is_empty() {
        return Err(Error::InvalidInput("Secret cannot be empty".to_string()));
    }

    let (memory_cost, time_cost, parallelism) = preset.cost();
    let params = Params::new(memory_cost, time_cost, parallelism, Some(KEY_LENGTH))
        .map_err(|e| Error::InvalidInput(format!("Invalid KDF parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key_bytes = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(secret.as_bytes(), salt.as_bytes(), &mut key_bytes)
        .map_err(|e| Error::ResourceExhausted(format!("Key derivation failed: {}", e)))?;

    Ok(ArchiveKey::from_bytes(key_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    // All tests use the Low preset; Standard only differs in cost.

    #[test]
    fn test_derive_key_deterministic() {
        let secret = Secret::new(b"test-password-123".to_vec());
        let salt = Salt::from_bytes([42u8; 32]);

        let key1 = derive_key(&secret, &salt, KdfPreset::Low).unwrap();
        let key2 = derive_key(&secret, &salt, KdfPreset::Low).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salt() {
        let secret = Secret::new(b"test-password-123".to_vec());
        let salt1 = Salt::from_bytes([1u8; 32]);
        let salt2 = Salt::from_bytes([2u8; 32]);

        let key1 = derive_key(&secret, &salt1, KdfPreset::Low).unwrap();
        let key2 = derive_key(&secret, &salt2, KdfPreset::Low).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_secret() {
        let salt = Salt::from_bytes([42u8; 32]);

        let key1 = derive_key(&Secret::new(b"password1".to_vec()), &salt, KdfPreset::Low).unwrap();
        let key2 = derive_key(&Secret::new(b"password2".to_vec()), &salt, KdfPreset::Low).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_preset_changes_key() {
        let secret = Secret::new(b"same-secret".to_vec());
        let salt = Salt::from_bytes([42u8; 32]);

        let low = derive_key(&secret, &salt, KdfPreset::Low).unwrap();
        let standard = derive_key(&secret, &salt, KdfPreset::Standard).unwrap();

        assert_ne!(low.as_bytes(), standard.as_bytes());
    }

    #[test]
    fn test_derive_key_empty_secret_fails() {
        let salt = Salt::generate();

        let result = derive_key(&Secret::new(Vec::new()), &salt, KdfPreset::Low);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_preset_ids_round_trip() {
        for preset in [KdfPreset::Standard, KdfPreset::Low] {
            assert_eq!(KdfPreset::from_id(preset.id()), Some(preset));
        }
        assert_eq!(KdfPreset::from_id(0xFF), None);
    }
}
