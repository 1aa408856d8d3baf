//! Trust material for the validator.
//!
//! A [`VerifierConfig`] is built once at startup and passed by reference to
//! every verification. The comment-signing public key is kept in its encoded
//! form and decoded on first use; the decoded key (or the decoding error) is
//! cached inside the config.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as base64_engine, Engine};
use once_cell::sync::OnceCell;
use ring::signature::UnparsedPublicKey;
use thiserror::Error;
use tracing::error;
use x509_parser::oid_registry::OID_KEY_TYPE_EC_PUBLIC_KEY;
use x509_parser::prelude::{FromDer, SubjectPublicKeyInfo};

use crate::verify::ecdsa_public_key;

#[cfg(all(feature = "test-bypass", not(debug_assertions)))]
compile_error!("the `test-bypass` feature must not be enabled in release builds");

/// Why the configured public key could not be used.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("no public key configured")]
    Missing,

    #[error("public key is neither PEM nor base64: {0}")]
    Encoding(String),

    #[error("invalid SubjectPublicKeyInfo: {0}")]
    Der(String),

    #[error("unsupported public key: expected an uncompressed P-256 point")]
    Unsupported,
}

type DecodedKey = std::result::Result<UnparsedPublicKey<Vec<u8>>, KeyError>;

pub struct VerifierConfig {
    expected_legacy_signature: Option<Vec<u8>>,
    public_key_blob: Option<String>,
    public_key: OnceCell<DecodedKey>,
    bypass_checks: bool,
}

impl VerifierConfig {
    pub fn builder() -> VerifierConfigBuilder {
        VerifierConfigBuilder::default()
    }

    /// Load trust material from files.
    ///
    /// The public key file holds a PEM `PUBLIC KEY` or a base64 encoded
    /// SubjectPublicKeyInfo. The legacy certificate is DER, or a PEM
    /// `CERTIFICATE` whose contents are used.
    pub fn load(public_key: Option<&Path>, legacy_certificate: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(path) = public_key {
            let blob = fs::read_to_string(path)
                .with_context(|| format!("reading public key {}", path.display()))?;
            builder = builder.public_key(blob);
        }

        if let Some(path) = legacy_certificate {
            let content = fs::read(path)
                .with_context(|| format!("reading legacy certificate {}", path.display()))?;
            let der = match pem::parse(&content) {
                Ok(pem) => pem.into_contents(),
                Err(_) => content,
            };
            builder = builder.legacy_signature(der);
        }

        Ok(builder.build())
    }

    /// True when both the legacy signature and a public key were supplied.
    pub fn has_trust_material(&self) -> bool {
        self.expected_legacy_signature.is_some() && self.public_key_blob.is_some()
    }

    pub fn expected_legacy_signature(&self) -> Option<&[u8]> {
        self.expected_legacy_signature.as_deref()
    }

    /// The comment-signing key, decoded on first call.
    ///
    /// A decoding failure is logged once and returned on every call.
    pub fn public_key(&self) -> std::result::Result<&UnparsedPublicKey<Vec<u8>>, &KeyError> {
        self.public_key
            .get_or_init(|| {
                let blob = self.public_key_blob.as_deref().ok_or(KeyError::Missing)?;
                decode_public_key(blob)
                    .map(ecdsa_public_key)
                    .inspect_err(|e| error!("cannot decode comment signing public key: {e}"))
            })
            .as_ref()
    }

    /// Whether cryptographic checks are skipped. Always false unless the
    /// config was built with `disable_signature_checks` in a test build.
    pub fn checks_disabled(&self) -> bool {
        self.bypass_checks
    }
}

impl fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifierConfig")
            .field(
                "expected_legacy_signature",
                &self.expected_legacy_signature.as_ref().map(Vec::len),
            )
            .field("public_key", &self.public_key_blob.is_some())
            .field("bypass_checks", &self.bypass_checks)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct VerifierConfigBuilder {
    expected_legacy_signature: Option<Vec<u8>>,
    public_key_blob: Option<String>,
    bypass_checks: bool,
}

impl VerifierConfigBuilder {
    /// Raw certificate bytes the legacy scheme compares against.
    pub fn legacy_signature(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.expected_legacy_signature = Some(bytes.into());
        self
    }

    /// Encoded comment-signing public key (PEM or base64 SubjectPublicKeyInfo).
    pub fn public_key(mut self, blob: impl Into<String>) -> Self {
        self.public_key_blob = Some(blob.into());
        self
    }

    /// Accept every package that passes the metadata check.
    #[cfg(any(test, feature = "test-bypass"))]
    pub fn disable_signature_checks(mut self) -> Self {
        self.bypass_checks = true;
        self
    }

    pub fn build(self) -> VerifierConfig {
        VerifierConfig {
            expected_legacy_signature: self.expected_legacy_signature,
            public_key_blob: self.public_key_blob,
            public_key: OnceCell::new(),
            bypass_checks: self.bypass_checks,
        }
    }
}

/// Decode a PEM or base64 SubjectPublicKeyInfo into an uncompressed EC point.
pub fn decode_public_key(blob: &str) -> std::result::Result<Vec<u8>, KeyError> {
    let der = if blob.contains("-----BEGIN") {
        let pem = pem::parse(blob).map_err(|e| KeyError::Encoding(e.to_string()))?;
        if pem.tag() != "PUBLIC KEY" {
            return Err(KeyError::Encoding(format!("unexpected PEM tag {}", pem.tag())));
        }
        pem.into_contents()
    } else {
        let compact: String = blob.split_whitespace().collect();
        base64_engine
            .decode(compact)
            .map_err(|e| KeyError::Encoding(e.to_string()))?
    };

    let (rest, spki) =
        SubjectPublicKeyInfo::from_der(&der).map_err(|e| KeyError::Der(e.to_string()))?;
    if !rest.is_empty() {
        return Err(KeyError::Der("trailing data".into()));
    }
    if spki.algorithm.algorithm != OID_KEY_TYPE_EC_PUBLIC_KEY {
        return Err(KeyError::Unsupported);
    }

    let point = spki.subject_public_key.data.to_vec();
    if point.len() != 65 || point[0] != 0x04 {
        return Err(KeyError::Unsupported);
    }
    Ok(point)
}
