//! Keyfile generation.
//!
//! A keyfile is an arbitrary-length blob of random bytes that callers
//! concatenate with the passphrase to form the combined secret. Reading
//! an existing keyfile is the caller's job; this module only creates
//! fresh ones.

use rand::RngCore;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use vaultpack_common::{wipe, Error, Result};

/// Number of random bytes written to a new keyfile.
pub const KEYFILE_LENGTH: usize = 64;

/// Generate a new keyfile at the given path.
///
/// Refuses to overwrite an existing file. On Unix the keyfile is created
/// with mode 0600.
///
/// # Errors
/// - `InvalidInput` if the path already exists
/// - `Io` if the file cannot be created or written
pub fn generate(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::InvalidInput(format!(
            "Refusing to overwrite existing keyfile: {}",
            path.display()
        )));
    }

    let mut bytes = [0u8; KEYFILE_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let result = options
        .open(path)
        .and_then(|mut file| file.write_all(&bytes))
        .map_err(|e| Error::io(path, e));

    wipe(&mut bytes);
    result
}
