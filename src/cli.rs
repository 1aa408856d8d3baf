use clap::Parser;
use std::path::PathBuf;

use crate::policy::{PackageInfo, SCOPE_KEY, START_URL_KEY};

#[derive(Parser, Debug)]
#[command(name = "webapk-verify")]
#[command(version)]
#[command(about = "Verify comment-signed WebAPK packages", long_about = None)]
#[command(after_help = "Examples:\n  \
  webapk-verify --public-key key.pem base.apk          check the comment signature only\n  \
  webapk-verify -l base.apk                            list entries covered by the signature\n  \
  webapk-verify --public-key key.pem --legacy-cert legacy.der \\\n      \
  --package org.chromium.webapk.a1 --start-url https://example.com/ base.apk")]
pub struct Cli {
    /// Package file to verify
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Comment signing public key (PEM or base64 SubjectPublicKeyInfo)
    #[arg(long, value_name = "FILE", env = "WEBAPK_PUBLIC_KEY")]
    pub public_key: Option<PathBuf>,

    /// Expected legacy signing certificate (DER or PEM)
    #[arg(long, value_name = "FILE", env = "WEBAPK_LEGACY_CERT")]
    pub legacy_cert: Option<PathBuf>,

    /// Declared package name
    #[arg(long = "package", value_name = "NAME")]
    pub package_name: Option<String>,

    /// Declared start URL; enables the full trust policy
    #[arg(long, value_name = "URL")]
    pub start_url: Option<String>,

    /// Declared navigation scope
    #[arg(long, value_name = "URL")]
    pub scope: Option<String>,

    /// Signing certificate reported for the package (repeatable)
    #[arg(long = "cert", value_name = "FILE")]
    pub certs: Vec<PathBuf>,

    /// Also require this URL to be inside the package scope
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// List entries and exit
    #[arg(short = 'l')]
    pub list: bool,

    /// Print the SHA-256 of the signed data and exit
    #[arg(long)]
    pub digest: bool,

    /// Verbose logging (-vv => debug)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_inspect(&self) -> bool {
        self.list || self.digest
    }

    /// Whether package metadata was given, selecting the full policy.
    pub fn uses_policy(&self) -> bool {
        self.start_url.is_some()
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    /// Default tracing filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (q, _) if q > 1 => "off",
            (1, _) => "error",
            (_, 0) => "warn",
            (_, 1) => "info",
            (_, 2) => "debug",
            _ => "trace",
        }
    }

    /// Package metadata as the introspection layer would report it.
    pub fn package_info(&self) -> std::io::Result<PackageInfo> {
        let name = self.package_name.clone().unwrap_or_default();
        let mut package = PackageInfo::new(name, self.file.clone());

        if let Some(url) = &self.start_url {
            package = package.with_meta_data(START_URL_KEY, url.clone());
        }
        if let Some(scope) = &self.scope {
            package = package.with_meta_data(SCOPE_KEY, scope.clone());
        }
        for path in &self.certs {
            package = package.with_certificate(std::fs::read(path)?);
        }

        Ok(package)
    }
}
