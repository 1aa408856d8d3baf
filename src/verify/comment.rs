//! Signature embedded in the archive comment.
//!
//! Signers append `webapk:<key id>:<hex signature>` to the ZIP comment. The
//! match may appear anywhere in the comment; the first one wins.

use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT_SIGNATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"webapk:(\d+):([a-fA-F0-9]+)").expect("valid regex"));

/// True when `comment` contains a signature pattern at all.
pub fn has_comment_signature(comment: &str) -> bool {
    COMMENT_SIGNATURE.is_match(comment)
}

/// Decode the signature bytes from the first `webapk:<id>:<hex>` match.
///
/// Returns `None` when there is no match or the hex digits have odd length.
pub fn parse_comment_signature(comment: &str) -> Option<Vec<u8>> {
    let captures = COMMENT_SIGNATURE.captures(comment)?;
    hex::decode(&captures[2]).ok()
}

/// Numeric key id of the first match, for diagnostics.
pub fn signature_key_id(comment: &str) -> Option<u64> {
    let captures = COMMENT_SIGNATURE.captures(comment)?;
    captures[1].parse().ok()
}
