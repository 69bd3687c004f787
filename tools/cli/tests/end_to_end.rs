//! End-to-end coverage of the full pack -> seal -> open -> unpack path.

use std::fs;
use tempfile::TempDir;

use vaultpack_archive::{pack_files, unpack_files};
use vaultpack_common::{Error, Secret};
use vaultpack_crypto::{open, seal, KdfPreset};

fn secret(bytes: &[u8]) -> Secret {
    Secret::new(bytes.to_vec())
}

/// Build the docs/ tree: docs/a.txt = "hello", docs/sub/b.txt = "world".
fn build_docs_tree(root: &TempDir) -> std::path::PathBuf {
    let docs = root.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("a.txt"), b"hello").unwrap();
    fs::create_dir(docs.join("sub")).unwrap();
    fs::write(docs.join("sub").join("b.txt"), b"world").unwrap();
    docs
}

#[test]
fn pack_seal_open_unpack_roundtrip() {
    let src = TempDir::new().unwrap();
    let docs = build_docs_tree(&src);

    let stream = pack_files(&[&docs]).unwrap();
    let blob = seal(secret(b"pw1"), &stream, KdfPreset::Low).unwrap();

    let opened = open(secret(b"pw1"), &blob).unwrap();
    assert_eq!(opened, stream);

    let dest = TempDir::new().unwrap();
    unpack_files(&opened, dest.path(), true).unwrap();

    assert_eq!(
        fs::read(dest.path().join("docs").join("a.txt")).unwrap(),
        b"hello"
    );
    assert_eq!(
        fs::read(dest.path().join("docs").join("sub").join("b.txt")).unwrap(),
        b"world"
    );
}

#[test]
fn wrong_password_is_rejected() {
    let src = TempDir::new().unwrap();
    let docs = build_docs_tree(&src);

    let stream = pack_files(&[&docs]).unwrap();
    let blob = seal(secret(b"pw1"), &stream, KdfPreset::Low).unwrap();

    let result = open(secret(b"pw2"), &blob);
    assert!(matches!(result, Err(Error::AuthenticationFailed)));
}

#[test]
fn keyfile_changes_the_secret() {
    let src = TempDir::new().unwrap();
    let docs = build_docs_tree(&src);

    let stream = pack_files(&[&docs]).unwrap();
    let combined = Secret::combine(b"pw1", Some(b"keyfile-bytes"));
    let blob = seal(combined.clone(), &stream, KdfPreset::Low).unwrap();

    // Password alone is not enough once a keyfile is in the mix.
    let result = open(secret(b"pw1"), &blob);
    assert!(matches!(result, Err(Error::AuthenticationFailed)));

    let opened = open(combined, &blob).unwrap();
    assert_eq!(opened, stream);
}

#[test]
fn listing_after_open_is_side_effect_free() {
    let src = TempDir::new().unwrap();
    let docs = build_docs_tree(&src);

    let stream = pack_files(&[&docs]).unwrap();
    let blob = seal(secret(b"pw1"), &stream, KdfPreset::Low).unwrap();
    let opened = open(secret(b"pw1"), &blob).unwrap();

    let dest = TempDir::new().unwrap();
    let entries = unpack_files(&opened, dest.path(), false).unwrap();

    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["docs", "docs/a.txt", "docs/sub", "docs/sub/b.txt"]);
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
}
