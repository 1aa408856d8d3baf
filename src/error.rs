//! Verification outcomes.
//!
//! Every structural or cryptographic failure maps to exactly one
//! [`VerifyError`] variant. None of them are retryable: a package that fails
//! any check is simply not verified. Callers may log the [`code`](VerifyError::code)
//! but must not branch trust decisions on which failure occurred.

use thiserror::Error;

/// Closed set of reasons a package failed verification.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifyError {
    /// Magic number mismatch, truncated record, or an offset outside the file.
    #[error("malformed ZIP container")]
    BadContainer,

    #[error("extra field too large")]
    ExtraFieldTooLarge,

    #[error("file comment too large")]
    FileCommentTooLarge,

    /// The signature did not match the signed data.
    #[error("incorrect signature")]
    IncorrectSignature,

    /// The archive comment carries no `webapk:<id>:<hex>` signature.
    #[error("signature not found in archive comment")]
    SignatureNotFound,

    /// More unsigned `META-INF/` entries than allowed.
    #[error("too many META-INF/ files")]
    TooManyReservedFiles,

    /// Unexplained gap or overlap between entries, or trailing bytes.
    #[error("unexpected blank space in container")]
    BadBlankSpace,

    /// A signing block was found but exceeds the size limit.
    #[error("signing block too large")]
    BadSigningBlock,
}

impl VerifyError {
    /// Stable numeric code for logs. `0` is reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            VerifyError::BadContainer => 1,
            VerifyError::ExtraFieldTooLarge => 2,
            VerifyError::FileCommentTooLarge => 3,
            VerifyError::IncorrectSignature => 4,
            VerifyError::SignatureNotFound => 5,
            VerifyError::TooManyReservedFiles => 6,
            VerifyError::BadBlankSpace => 7,
            VerifyError::BadSigningBlock => 8,
        }
    }
}

/// Result alias used by the container reader and the verifier.
pub type VerifyResult<T> = std::result::Result<T, VerifyError>;
