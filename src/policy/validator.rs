//! Decides whether an installed package is a trusted WebAPK.
//!
//! Checks run in a fixed order and the first accepting one wins:
//!
//! 1. quick rejection when trust material or the start URL is missing
//! 2. the legacy scheme: two certificates, one equal to the expected one
//! 3. the Maps Lite exception
//! 4. the comment signature over the package contents
//!
//! The legacy checks come first for compatibility with packages signed
//! before comment signing existed.

use tracing::{debug, info, warn};

use super::config::{KeyError, VerifierConfig};
use super::package::PackageInfo;
use crate::error::VerifyError;
use crate::io;
use crate::verify::verify_package;

/// Package name prefix reserved for WebAPKs.
pub const WEBAPK_PACKAGE_PREFIX: &str = "org.chromium.webapk";

/// Number of certificates a legacy-signed WebAPK carries.
const LEGACY_CERTIFICATE_COUNT: usize = 2;

pub const MAPSLITE_PACKAGE_NAME: &str = "com.google.android.apps.mapslite";
pub const MAPSLITE_URL_PREFIX: &str = "https://www.google.com/maps";

/// Which check accepted a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptedBy {
    TestBypass,
    LegacySignature,
    MapsLite,
    CommentSignature,
}

/// Why a package was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The config lacks the legacy signature or the public key.
    NoTrustMaterial,
    /// The package declares no start URL.
    NotWebApk,
    /// The configured public key could not be decoded.
    KeyUnavailable,
    /// The package file could not be read.
    Unreadable,
    Verification(VerifyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted(AcceptedBy),
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }
}

/// Validator bound to one [`VerifierConfig`].
#[derive(Debug, Clone, Copy)]
pub struct WebApkValidator<'c> {
    config: &'c VerifierConfig,
}

impl<'c> WebApkValidator<'c> {
    pub fn new(config: &'c VerifierConfig) -> Self {
        Self { config }
    }

    /// True when `package` is a trusted WebAPK.
    pub fn is_valid(&self, package: &PackageInfo) -> bool {
        let verdict = self.verify_detailed(package);
        match verdict {
            Verdict::Accepted(by) => {
                info!(package = %package.package_name, ?by, "webapk verified");
            }
            Verdict::Rejected(reason) => {
                debug!(package = %package.package_name, ?reason, "webapk rejected");
            }
        }
        verdict.is_accepted()
    }

    /// True when `package` is trusted and `url` falls inside its scope.
    pub fn is_valid_for_url(&self, package: &PackageInfo, url: &str) -> bool {
        let in_scope = package
            .effective_scope()
            .is_some_and(|scope| url.starts_with(scope));
        in_scope && self.is_valid(package)
    }

    /// Keep the resolver's candidates for `url` that are trusted WebAPKs,
    /// preserving their order.
    pub fn filter_handlers<'p>(
        &self,
        candidates: &'p [PackageInfo],
        url: &str,
    ) -> Vec<&'p PackageInfo> {
        candidates
            .iter()
            .filter(|package| self.is_valid_for_url(package, url))
            .collect()
    }

    /// Run the full decision chain and report which step decided.
    pub fn verify_detailed(&self, package: &PackageInfo) -> Verdict {
        if !self.config.has_trust_material() {
            warn!("webapk validation failure: trust material not configured");
            return Verdict::Rejected(RejectReason::NoTrustMaterial);
        }
        if package.start_url().is_none() {
            return Verdict::Rejected(RejectReason::NotWebApk);
        }
        if self.config.checks_disabled() {
            return Verdict::Accepted(AcceptedBy::TestBypass);
        }
        if self.matches_legacy_signature(package) {
            return Verdict::Accepted(AcceptedBy::LegacySignature);
        }
        if is_maps_lite(package) {
            return Verdict::Accepted(AcceptedBy::MapsLite);
        }
        match self.verify_comment_signature(package) {
            Ok(()) => Verdict::Accepted(AcceptedBy::CommentSignature),
            Err(reason) => Verdict::Rejected(reason),
        }
    }

    fn matches_legacy_signature(&self, package: &PackageInfo) -> bool {
        let Some(expected) = self.config.expected_legacy_signature() else {
            return false;
        };
        package.package_name.starts_with(WEBAPK_PACKAGE_PREFIX)
            && package.signing_certificates.len() == LEGACY_CERTIFICATE_COUNT
            && package
                .signing_certificates
                .iter()
                .any(|certificate| certificate.as_slice() == expected)
    }

    fn verify_comment_signature(&self, package: &PackageInfo) -> Result<(), RejectReason> {
        let key = self.config.public_key().map_err(|e| match e {
            KeyError::Missing => RejectReason::NoTrustMaterial,
            _ => RejectReason::KeyUnavailable,
        })?;

        let bytes = io::read_package(&package.source_path).map_err(|e| {
            warn!(
                package = %package.package_name,
                path = %package.source_path.display(),
                "cannot read package: {e:#}"
            );
            RejectReason::Unreadable
        })?;

        verify_package(&bytes, key).map_err(|e| {
            debug!(
                package = %package.package_name,
                code = e.code(),
                "comment signature verification failed: {e}"
            );
            RejectReason::Verification(e)
        })
    }
}

/// The one package accepted by name and URL alone.
fn is_maps_lite(package: &PackageInfo) -> bool {
    package.package_name == MAPSLITE_PACKAGE_NAME
        && package
            .start_url()
            .is_some_and(|url| url.starts_with(MAPSLITE_URL_PREFIX))
        && package
            .scope()
            .is_some_and(|scope| scope.starts_with(MAPSLITE_URL_PREFIX))
}
