//! Trust policy: which installed packages count as verified WebAPKs.
//!
//! - [`config`]: trust material, built once and shared by reference
//! - [`package`]: package metadata supplied by the caller
//! - [`validator`]: the ordered decision chain

pub mod config;
pub mod package;
pub mod validator;

pub use config::{KeyError, VerifierConfig, VerifierConfigBuilder};
pub use package::{PackageInfo, SCOPE_KEY, START_URL_KEY};
pub use validator::{AcceptedBy, RejectReason, Verdict, WebApkValidator};
