//! Builds the byte stream a comment signature covers.
//!
//! Entries are visited in name order, independent of their position in the
//! file. For each entry the stream carries the name length, the name, the
//! compressed size and the compressed bytes, so that no two different
//! archives produce the same stream by shifting bytes between fields.
//!
//! Entries under `META-INF/` are skipped because they are written after
//! signing, but only a handful of them are tolerated.

use ring::digest;

use crate::error::{VerifyError, VerifyResult};
use crate::zip::{ByteReader, ZipEntry};

/// Prefix of entries excluded from the signed data.
pub const RESERVED_PREFIX: &str = "META-INF/";

/// Maximum number of `META-INF/` entries (allows for dual signing).
pub const MAX_RESERVED_FILES: usize = 5;

/// Destination for the signed byte stream.
pub trait SignedDataSink {
    fn update(&mut self, data: &[u8]);
}

impl SignedDataSink for Vec<u8> {
    fn update(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}

impl SignedDataSink for digest::Context {
    fn update(&mut self, data: &[u8]) {
        digest::Context::update(self, data);
    }
}

/// True for entries excluded from the signed data.
pub fn is_reserved(entry: &ZipEntry) -> bool {
    entry.raw_name.starts_with(RESERVED_PREFIX.as_bytes())
}

/// Feed the signed data for `entries` into `sink`.
///
/// `entries` must have their `header_size` resolved.
pub fn accumulate<S: SignedDataSink + ?Sized>(
    reader: ByteReader<'_>,
    entries: &[ZipEntry],
    sink: &mut S,
) -> VerifyResult<()> {
    let mut sorted: Vec<&ZipEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.raw_name.cmp(&b.raw_name));

    let mut reserved = 0usize;
    for entry in sorted {
        if is_reserved(entry) {
            reserved += 1;
            if reserved > MAX_RESERVED_FILES {
                return Err(VerifyError::TooManyReservedFiles);
            }
            continue;
        }

        let name = entry.raw_name.as_slice();
        let (data, _) = reader.read_bytes(entry.data_offset(), entry.compressed_size as usize)?;

        sink.update(&(name.len() as u32).to_le_bytes());
        sink.update(name);
        sink.update(&entry.compressed_size.to_le_bytes());
        sink.update(data);
    }

    Ok(())
}

/// Size of the stream [`accumulate`] would produce, for preallocation.
pub fn signed_data_len(entries: &[ZipEntry]) -> usize {
    entries
        .iter()
        .filter(|entry| !is_reserved(entry))
        .map(|entry| 8 + entry.raw_name.len() + entry.compressed_size as usize)
        .sum()
}
