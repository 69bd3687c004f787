//! VaultPack CLI - password-protected file archiver.
//!
//! Packs files into an encrypted archive and later lists, unpacks, or
//! extracts it. All errors exit with status 1.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use vaultpack_archive::{pack_files, unpack_files, EntryKind};
use vaultpack_common::{wipe, Secret};
use vaultpack_crypto::{keyfile, open, seal, KdfPreset};

#[derive(Parser)]
#[command(name = "vaultpack")]
#[command(about = "VaultPack - password-protected file archiver")]
#[command(version)]
struct Cli {
    /// Do not use a password (requires a keyfile).
    #[arg(short = 'p', long)]
    no_password: bool,

    /// Generate a new keyfile at the given path and exit.
    #[arg(short = 'g', long, value_name = "PATH")]
    generate_key: Option<PathBuf>,

    /// Keyfile to combine with the password (or use alone with -p).
    #[arg(short = 'k', long, value_name = "PATH")]
    keyfile: Option<PathBuf>,

    /// Output path: archive file when packing, directory when unpacking,
    /// packed-stream file when extracting.
    #[arg(short = 'o', long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Use the low KDF cost preset.
    #[arg(short = 'l', long)]
    low: bool,

    /// Only print errors and password prompts.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// List archive contents without unpacking.
    #[arg(short = 't', long)]
    list: bool,

    /// Unpack the archive instead of packing.
    #[arg(short = 'u', long, conflicts_with = "extract")]
    unpack: bool,

    /// Enable verbose logging.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Decrypt the archive but write the packed stream without unpacking.
    #[arg(short = 'x', long)]
    extract: bool,

    /// Files to pack, or the single archive to read.
    #[arg(required_unless_present = "generate_key")]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; quiet overrides verbose.
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(path) = cli.generate_key.as_deref() {
        keyfile::generate(path).context("Failed to generate keyfile")?;
        say(&cli, &format!("New keyfile written to {}", path.display()));
        return Ok(());
    }

    let reading = cli.unpack || cli.extract || cli.list;
    let secret = gather_secret(&cli, reading)?;

    let start = Instant::now();

    if reading {
        if cli.files.len() != 1 {
            bail!("Only one archive may be read at a time");
        }
        run_read(&cli, secret)?;
    } else {
        run_pack(&cli, secret)?;
    }

    say(&cli, &format!("Completed in {:.2?}.", start.elapsed()));
    Ok(())
}

/// Print a progress message unless quiet mode is on.
fn say(cli: &Cli, message: &str) {
    if !cli.quiet {
        println!("{}", message);
    }
}

/// Prompt for a password securely.
fn prompt_password(prompt: &str) -> Result<Vec<u8>> {
    let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
    Ok(password.into_bytes())
}

/// Assemble the combined secret from the keyfile and/or password prompt.
///
/// Packing prompts twice and insists the entries match; read modes prompt
/// once. All intermediate buffers are wiped before returning.
fn gather_secret(cli: &Cli, reading: bool) -> Result<Secret> {
    let keyfile_bytes = match cli.keyfile.as_deref() {
        Some(path) => Some(
            fs::read(path).with_context(|| format!("Failed to read keyfile {}", path.display()))?,
        ),
        None => None,
    };

    let mut passphrase = if cli.no_password {
        if keyfile_bytes.is_none() {
            bail!("Must use a password, a keyfile, or both");
        }
        Vec::new()
    } else if reading {
        prompt_password("Archive password: ")?
    } else {
        loop {
            let mut pass = prompt_password("Archive password: ")?;
            let mut confirm = prompt_password("Confirm: ")?;

            if pass == confirm {
                wipe(&mut confirm);
                break pass;
            }
            wipe(&mut pass);
            wipe(&mut confirm);
            eprintln!("Passwords don't match.");
        }
    };

    let secret = Secret::combine(&passphrase, keyfile_bytes.as_deref());
    wipe(&mut passphrase);
    if let Some(mut keyfile_bytes) = keyfile_bytes {
        wipe(&mut keyfile_bytes);
    }

    Ok(secret)
}

/// Pack the input paths and seal them into the output archive.
fn run_pack(cli: &Cli, secret: Secret) -> Result<()> {
    let preset = if cli.low {
        KdfPreset::Low
    } else {
        KdfPreset::Standard
    };
    let out = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("files.enc"));

    say(cli, "Packing files...");
    let mut stream = pack_files(&cli.files).context("Failed to pack files")?;

    say(cli, "Encrypting archive...");
    let blob = seal(secret, &stream, preset).context("Failed to encrypt archive");
    wipe(&mut stream);
    let blob = blob?;

    say(cli, "Writing file...");
    fs::write(&out, &blob).with_context(|| format!("Failed to write {}", out.display()))?;

    Ok(())
}

/// Open the archive and unpack, list, or extract it.
fn run_read(cli: &Cli, secret: Secret) -> Result<()> {
    let archive_path = &cli.files[0];

    say(cli, "Reading encrypted archive...");
    let blob = fs::read(archive_path)
        .with_context(|| format!("Failed to read {}", archive_path.display()))?;

    say(cli, "Decrypting archive...");
    let mut stream = open(secret, &blob).context("Failed to decrypt archive")?;

    let result = if cli.unpack {
        let dest = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));
        say(cli, "Unpacking files...");
        unpack_files(&stream, &dest, true)
            .context("Failed to unpack archive")
            .map(|_| ())
    } else if cli.list {
        unpack_files(&stream, Path::new("."), false)
            .context("Failed to list archive")
            .map(|entries| {
                for entry in entries {
                    match entry.kind {
                        EntryKind::Directory => println!("  [DIR]  {}/", entry.path),
                        EntryKind::File => {
                            println!("  [FILE] {} ({} bytes)", entry.path, entry.size)
                        }
                    }
                }
            })
    } else {
        let out = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from("files.pack"));
        say(cli, "Extracting packed stream...");
        fs::write(&out, &stream).with_context(|| format!("Failed to write {}", out.display()))
    };

    wipe(&mut stream);
    result
}
