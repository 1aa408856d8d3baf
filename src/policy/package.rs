use std::collections::BTreeMap;
use std::path::PathBuf;

/// Manifest meta-data key carrying the start URL. Its presence marks a WebAPK.
pub const START_URL_KEY: &str = "org.chromium.webapk.shell_apk.startUrl";

/// Manifest meta-data key carrying the navigation scope.
pub const SCOPE_KEY: &str = "org.chromium.webapk.shell_apk.scope";

/// What the package-introspection layer knows about an installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub package_name: String,
    /// Raw bytes of each signing certificate the platform reports.
    pub signing_certificates: Vec<Vec<u8>>,
    /// Application meta-data from the manifest.
    pub meta_data: BTreeMap<String, String>,
    /// Location of the installed package file.
    pub source_path: PathBuf,
}

impl PackageInfo {
    pub fn new(package_name: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            package_name: package_name.into(),
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    pub fn with_certificate(mut self, certificate: impl Into<Vec<u8>>) -> Self {
        self.signing_certificates.push(certificate.into());
        self
    }

    pub fn with_meta_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta_data.insert(key.into(), value.into());
        self
    }

    pub fn start_url(&self) -> Option<&str> {
        self.meta_data.get(START_URL_KEY).map(String::as_str)
    }

    pub fn scope(&self) -> Option<&str> {
        self.meta_data.get(SCOPE_KEY).map(String::as_str)
    }

    /// URL prefix this package handles: its scope, or the start URL when no
    /// scope is declared.
    pub fn effective_scope(&self) -> Option<&str> {
        self.scope().or_else(|| self.start_url())
    }
}
