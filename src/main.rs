//! Main entry point for the webapk-verify CLI application.
//!
//! Verification reads the whole package from disk, so it runs on tokio's
//! blocking pool rather than on the runtime threads.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use webapk_verify::verify::{self, is_reserved};
use webapk_verify::{io, Cli, SignedPackage, VerifierConfig, WebApkValidator, ZipEntry, ZipParser};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging and dispatches to either
/// inspection or verification.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    tokio::task::spawn_blocking(move || {
        if cli.is_inspect() {
            inspect(&cli).map(|()| ExitCode::SUCCESS)
        } else {
            run_verify(&cli)
        }
    })
    .await?
}

/// Install a stderr tracing subscriber. `RUST_LOG` overrides `-v`/`-q`.
fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Verify the package and report the verdict.
///
/// With `--start-url` the full trust policy runs; otherwise only the comment
/// signature is checked against `--public-key`.
fn run_verify(cli: &Cli) -> Result<ExitCode> {
    let config = VerifierConfig::load(cli.public_key.as_deref(), cli.legacy_cert.as_deref())?;

    let valid = if cli.uses_policy() {
        let package = cli.package_info().context("reading package certificates")?;
        let validator = WebApkValidator::new(&config);
        match &cli.url {
            Some(url) => validator.is_valid_for_url(&package, url),
            None => validator.is_valid(&package),
        }
    } else {
        if cli.public_key.is_none() {
            bail!("--public-key is required to check a comment signature");
        }
        let key = config.public_key().map_err(|e| anyhow::anyhow!("{e}"))?;
        let bytes = io::read_package(&cli.file)?;
        match verify::verify_package(&bytes, key) {
            Ok(()) => true,
            Err(e) => {
                if !cli.is_quiet() {
                    eprintln!("{}: {} (code {})", cli.file.display(), e, e.code());
                }
                false
            }
        }
    };

    if !cli.is_quiet() {
        println!("{}: {}", cli.file.display(), if valid { "verified" } else { "NOT verified" });
    }
    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Print the container layout (`-l`) and/or the signed data digest (`--digest`).
fn inspect(cli: &Cli) -> Result<()> {
    let bytes = io::read_package(&cli.file)?;

    if cli.digest {
        let package = SignedPackage::read(&bytes)
            .with_context(|| format!("{}: not a signed package", cli.file.display()))?;
        let digest = package.signed_data_digest()?;
        println!("{}  {}", hex::encode(digest.as_ref()), cli.file.display());
        if let Some(id) = package.key_id() {
            println!("key id: {}", id);
        }
    }

    if cli.list {
        let (eocd, entries) = ZipParser::new(&bytes)
            .list_entries()
            .with_context(|| format!("{}: invalid container", cli.file.display()))?;
        list_entries(&entries);
        if !eocd.comment.is_empty() && !cli.is_quiet() {
            println!("comment: {}", eocd.comment);
        }
    }

    Ok(())
}

/// List entries in file order.
///
/// Entries excluded from the signed data are marked with `*`.
fn list_entries(entries: &[ZipEntry]) {
    println!("{:>10}  {:>6}  {:>10}  Name", "Offset", "Header", "Size");
    println!("{}", "-".repeat(50));

    let mut total = 0u64;
    for entry in entries {
        let marker = if is_reserved(entry) { "*" } else { " " };
        println!(
            "{:>10}  {:>6}  {:>10} {}{}",
            entry.position, entry.header_size, entry.compressed_size, marker, entry.file_name
        );
        total += entry.compressed_size as u64;
    }

    println!("{}", "-".repeat(50));
    println!("{:>10}  {:>6}  {:>10}  {} files", "", "", total, entries.len());
}
