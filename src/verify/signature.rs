use ring::digest;
use ring::signature::UnparsedPublicKey;
use tracing::debug;

use super::comment;
use super::digest::{accumulate, signed_data_len};
use crate::error::{VerifyError, VerifyResult};
use crate::zip::{EndOfCentralDirectory, ZipEntry, ZipParser};

/// A structurally valid package carrying a comment signature.
///
/// Construction performs every structural check; [`verify`](Self::verify)
/// only hashes and checks the signature.
#[derive(Debug)]
pub struct SignedPackage<'a> {
    parser: ZipParser<'a>,
    eocd: EndOfCentralDirectory,
    entries: Vec<ZipEntry>,
    signature: Vec<u8>,
}

impl<'a> SignedPackage<'a> {
    /// Parse `buf` as a comment-signed package.
    ///
    /// Archives whose comment carries no signature are rejected with
    /// [`VerifyError::SignatureNotFound`] before the Central Directory is read.
    pub fn read(buf: &'a [u8]) -> VerifyResult<Self> {
        let parser = ZipParser::new(buf);
        let eocd = parser.read_eocd()?;

        if !comment::has_comment_signature(&eocd.comment) {
            debug!("archive comment carries no signature");
            return Err(VerifyError::SignatureNotFound);
        }
        let signature = match comment::parse_comment_signature(&eocd.comment) {
            Some(signature) if !signature.is_empty() => signature,
            _ => {
                debug!("malformed signature in archive comment");
                return Err(VerifyError::SignatureNotFound);
            }
        };

        let entries = parser.read_entries(&eocd)?;
        debug!(
            entries = entries.len(),
            key_id = ?comment::signature_key_id(&eocd.comment),
            "parsed signed package"
        );

        Ok(Self {
            parser,
            eocd,
            entries,
            signature,
        })
    }

    /// Check the embedded signature against `key`.
    ///
    /// `ring` only verifies ECDSA over a complete message, so the signed
    /// stream is buffered in memory first.
    pub fn verify<B: AsRef<[u8]>>(&self, key: &UnparsedPublicKey<B>) -> VerifyResult<()> {
        let mut message = Vec::with_capacity(signed_data_len(&self.entries));
        accumulate(self.parser.reader(), &self.entries, &mut message)?;

        key.verify(&message, &self.signature)
            .map_err(|_| VerifyError::IncorrectSignature)
    }

    /// SHA-256 of the signed data stream.
    pub fn signed_data_digest(&self) -> VerifyResult<digest::Digest> {
        let mut ctx = digest::Context::new(&digest::SHA256);
        accumulate(self.parser.reader(), &self.entries, &mut ctx)?;
        Ok(ctx.finish())
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    pub fn comment(&self) -> &str {
        &self.eocd.comment
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn key_id(&self) -> Option<u64> {
        comment::signature_key_id(&self.eocd.comment)
    }
}

/// Parse `buf` and verify its comment signature with `key`.
pub fn verify_package<B: AsRef<[u8]>>(buf: &[u8], key: &UnparsedPublicKey<B>) -> VerifyResult<()> {
    SignedPackage::read(buf)?.verify(key)
}
