//! Sealing and opening of self-contained encrypted blobs.
//!
//! A sealed blob carries everything needed to re-derive its key (KDF
//! preset identifier and salt) plus the XChaCha20-Poly1305 nonce,
//! ciphertext, and tag. The entire header is fed to the cipher as
//! associated data, so a flipped header byte invalidates the tag even
//! though the header itself is not secret.
//!
//! # Blob layout (version 1)
//!
//! ```text
//! magic "vpak" (4) | version (1) | preset id (1) | salt (32) | nonce (24)
//! ciphertext || tag (16)
//! ```

use chacha20poly1305::{
    aead::{generic_array::GenericArray, Aead, AeadCore, KeyInit, OsRng, Payload},
    XChaCha20Poly1305,
};

use crate::kdf::{derive_key, KdfPreset};
use crate::keys::{Salt, SALT_LENGTH};
use vaultpack_common::{Error, Result, Secret};

/// Magic bytes identifying a sealed blob.
pub const MAGIC: [u8; 4] = *b"vpak";

/// Current blob format version.
pub const VERSION: u8 = 1;

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// Total header size: magic + version + preset + salt + nonce.
pub const HEADER_SIZE: usize = 4 + 1 + 1 + SALT_LENGTH + NONCE_SIZE;

/// Seal plaintext under a user secret.
///
/// Generates a fresh random salt and nonce, derives the key under the
/// given cost preset, and produces a self-contained blob.
///
/// # Postconditions
/// - Two calls with identical inputs produce different blobs (fresh
///   salt and nonce per call)
/// - The blob is `HEADER_SIZE + plaintext.len() + TAG_SIZE` bytes
///
/// # Errors
/// - `InvalidInput` if the secret is empty
/// - `ResourceExhausted` if key derivation cannot allocate
///
/// # Security
/// - The secret and the derived key are zeroized before this returns
pub fn seal(secret: Secret, plaintext: &[u8], preset: KdfPreset) -> Result<Vec<u8>> {
    let salt = Salt::generate();
    let key = derive_key(&secret, &salt, preset)?;

    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(key.as_bytes()));
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let mut blob = Vec::with_capacity(HEADER_SIZE + plaintext.len() + TAG_SIZE);
    blob.extend_from_slice(&MAGIC);
    blob.push(VERSION);
    blob.push(preset.id());
    blob.extend_from_slice(salt.as_bytes());
    blob.extend_from_slice(&nonce);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: &blob,
            },
        )
        .map_err(|_| Error::InvalidInput("Plaintext too large to seal".to_string()))?;

    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Open a sealed blob back into plaintext.
///
/// Re-derives the key from the header's salt and preset, then verifies
/// the authentication tag before releasing a single plaintext byte.
///
/// # Errors
/// - `MalformedBlob` if the header cannot be parsed (truncated, bad
///   magic, unknown version or preset)
/// - `AuthenticationFailed` if the tag does not verify; a wrong secret
///   and a tampered blob are deliberately indistinguishable
///
/// # Security
/// - The secret and the derived key are zeroized before this returns,
///   on success and on every error path
pub fn open(secret: Secret, blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < HEADER_SIZE + TAG_SIZE {
        return Err(Error::MalformedBlob("Blob too short".to_string()));
    }

    let (header, body) = blob.split_at(HEADER_SIZE);

    if header[..4] != MAGIC {
        return Err(Error::MalformedBlob("Bad magic bytes".to_string()));
    }
    if header[4] != VERSION {
        return Err(Error::MalformedBlob(format!(
            "Unsupported blob version: {}",
            header[4]
        )));
    }
    let preset = KdfPreset::from_id(header[5]).ok_or_else(|| {
        Error::MalformedBlob(format!("Unknown KDF preset identifier: {}", header[5]))
    })?;

    let mut salt_bytes = [0u8; SALT_LENGTH];
    salt_bytes.copy_from_slice(&header[6..6 + SALT_LENGTH]);
    let salt = Salt::from_bytes(salt_bytes);
    let nonce = GenericArray::from_slice(&header[6 + SALT_LENGTH..HEADER_SIZE]);

    let key = derive_key(&secret, &salt, preset)?;
    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(key.as_bytes()));

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: body,
                aad: header,
            },
        )
        .map_err(|_| Error::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secret(bytes: &[u8]) -> Secret {
        Secret::new(bytes.to_vec())
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let plaintext = b"attack at dawn";

        let blob = seal(secret(b"pw1"), plaintext, KdfPreset::Low).unwrap();
        let opened = open(secret(b"pw1"), &blob).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_seal_open_standard_preset() {
        let plaintext = b"standard cost";

        let blob = seal(secret(b"pw1"), plaintext, KdfPreset::Standard).unwrap();
        let opened = open(secret(b"pw1"), &blob).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_blob_size() {
        let plaintext = b"sized";

        let blob = seal(secret(b"pw1"), plaintext, KdfPreset::Low).unwrap();

        assert_eq!(blob.len(), HEADER_SIZE + plaintext.len() + TAG_SIZE);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let blob = seal(secret(b"pw1"), b"secret data", KdfPreset::Low).unwrap();

        let result = open(secret(b"pw2"), &blob);
        assert!(matches!(result, Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_seal_is_randomized() {
        let blob1 = seal(secret(b"pw1"), b"same plaintext", KdfPreset::Low).unwrap();
        let blob2 = seal(secret(b"pw1"), b"same plaintext", KdfPreset::Low).unwrap();

        // Salt, nonce, and ciphertext must all differ between seals.
        assert_ne!(blob1[6..6 + SALT_LENGTH], blob2[6..6 + SALT_LENGTH]);
        assert_ne!(blob1[6 + SALT_LENGTH..HEADER_SIZE], blob2[6 + SALT_LENGTH..HEADER_SIZE]);
        assert_ne!(blob1[HEADER_SIZE..], blob2[HEADER_SIZE..]);
    }

    #[test]
    fn test_flipped_byte_rejected_in_every_region() {
        let blob = seal(secret(b"pw1"), b"integrity", KdfPreset::Low).unwrap();

        // One offset inside each blob region: magic, version, preset,
        // salt, nonce, ciphertext, tag.
        let offsets = [
            0,
            4,
            5,
            6,
            6 + SALT_LENGTH,
            HEADER_SIZE,
            blob.len() - 1,
        ];

        for offset in offsets {
            let mut tampered = blob.clone();
            tampered[offset] ^= 0xFF;

            let result = open(secret(b"pw1"), &tampered);
            assert!(
                matches!(
                    result,
                    Err(Error::AuthenticationFailed) | Err(Error::MalformedBlob(_))
                ),
                "flip at offset {} was not rejected",
                offset
            );
        }
    }

    #[test]
    fn test_truncated_blob_is_malformed() {
        let blob = seal(secret(b"pw1"), b"short", KdfPreset::Low).unwrap();

        let result = open(secret(b"pw1"), &blob[..HEADER_SIZE + TAG_SIZE - 1]);
        assert!(matches!(result, Err(Error::MalformedBlob(_))));
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let blob = seal(secret(b"pw1"), b"", KdfPreset::Low).unwrap();
        let opened = open(secret(b"pw1"), &blob).unwrap();

        assert!(opened.is_empty());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = seal(Secret::new(Vec::new()), b"data", KdfPreset::Low);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    proptest! {
        // Few cases: each one pays the full Argon2 cost twice.
        #![proptest_config(ProptestConfig::with_cases(4))]

        #[test]
        fn prop_roundtrip_arbitrary_plaintext(plaintext in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let blob = seal(secret(b"prop-pw"), &plaintext, KdfPreset::Low).unwrap();
            let opened = open(secret(b"prop-pw"), &blob).unwrap();
            prop_assert_eq!(opened, plaintext);
        }
    }
}
