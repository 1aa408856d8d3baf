//! Comment-signed package verification.
//!
//! - [`comment`]: extracts the `webapk:<id>:<hex>` signature from the archive comment
//! - [`digest`]: builds the byte stream the signature covers
//! - [`SignedPackage`]: ties the container parser, the comment and the
//!   digest together and runs the ECDSA P-256 / SHA-256 check

pub mod comment;
pub mod digest;
mod signature;

pub use digest::{is_reserved, SignedDataSink, MAX_RESERVED_FILES, RESERVED_PREFIX};
pub use signature::{verify_package, SignedPackage};

use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};

/// Wrap an uncompressed P-256 public point for comment signature checks.
pub fn ecdsa_public_key<B: AsRef<[u8]>>(point: B) -> UnparsedPublicKey<B> {
    UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, point)
}
