//! # webapk-verify
//!
//! Verifies that an installed WebAPK was signed by a trusted authority,
//! without relying on the platform's package installer.
//!
//! The package file is parsed directly: the ZIP container must be laid out
//! so that every byte outside a few `META-INF/` entries and an optional APK
//! signing block is covered by an ECDSA P-256 signature stored as
//! `webapk:<id>:<hex>` in the archive comment. Two older trust paths are
//! checked first for compatibility: a fixed legacy signing certificate and
//! a hard-coded exception for Maps Lite.
//!
//! ## Features
//!
//! - Bounded, allocation-light parsing of untrusted ZIP containers
//! - Rejection of gaps, overlaps and trailing data that could hide payload
//! - Length-prefixed, name-ordered signed data stream
//! - Ordered trust policy over package metadata
//!
//! ## Example
//!
//! ```no_run
//! use webapk_verify::{PackageInfo, VerifierConfig, WebApkValidator, START_URL_KEY};
//!
//! let config = VerifierConfig::builder()
//!     .legacy_signature(std::fs::read("legacy.der")?)
//!     .public_key(std::fs::read_to_string("webapk_key.pem")?)
//!     .build();
//! let validator = WebApkValidator::new(&config);
//!
//! let package = PackageInfo::new("org.chromium.webapk.a1b2", "/data/app/base.apk")
//!     .with_meta_data(START_URL_KEY, "https://example.com/");
//! if validator.is_valid(&package) {
//!     println!("trusted");
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod policy;
pub mod verify;
pub mod zip;

pub use cli::Cli;
pub use error::{VerifyError, VerifyResult};
pub use io::{LocalFileReader, ReadAt};
pub use policy::{
    AcceptedBy, KeyError, PackageInfo, RejectReason, Verdict, VerifierConfig, WebApkValidator,
    SCOPE_KEY, START_URL_KEY,
};
pub use verify::{verify_package, SignedPackage};
pub use zip::{ZipEntry, ZipParser};
