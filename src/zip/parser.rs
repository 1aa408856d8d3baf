//! Defensive ZIP container parser.
//!
//! The parser works on a fully buffered package and accepts only archives
//! whose structure leaves no room for unhashed payload:
//!
//! 1. Find the End of Central Directory (EOCD) at the file's end; nothing may
//!    follow its comment.
//! 2. Read exactly `total_entries` Central Directory records, which must end
//!    exactly where the EOCD starts.
//! 3. Read every Local File Header in file order and check that the entries
//!    tile the file up to the Central Directory. A single gap right before
//!    the Central Directory is allowed when it ends with the APK signing
//!    block magic and is small enough.
//!
//! Every violation maps to a specific [`VerifyError`].

use tracing::debug;

use super::reader::ByteReader;
use super::structures::*;
use crate::error::{VerifyError, VerifyResult};

/// Low-level ZIP structure parser over an in-memory package.
#[derive(Debug, Clone, Copy)]
pub struct ZipParser<'a> {
    reader: ByteReader<'a>,
}

impl<'a> ZipParser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(buf),
        }
    }

    /// The underlying bounds-checked reader.
    pub fn reader(&self) -> ByteReader<'a> {
        self.reader
    }

    /// Find the offset of the EOCD signature.
    ///
    /// Searches backwards from the last position a minimal EOCD could start,
    /// but never further than the largest possible comment allows.
    pub fn find_eocd(&self) -> VerifyResult<usize> {
        let last = self
            .reader
            .len()
            .checked_sub(EOCD_MIN_SIZE)
            .ok_or(VerifyError::BadContainer)?;
        let first = last.saturating_sub(EOCD_MAX_SIZE);

        (first..=last)
            .rev()
            .find(|&offset| self.reader.has_signature(offset, EOCD_SIGNATURE))
            .ok_or_else(|| {
                debug!("no end of central directory record found");
                VerifyError::BadContainer
            })
    }

    /// Locate and parse the EOCD record, including the archive comment.
    ///
    /// # Errors
    ///
    /// [`VerifyError::BadContainer`] when no record exists or the comment is
    /// truncated, [`VerifyError::BadBlankSpace`] when bytes follow the comment.
    pub fn read_eocd(&self) -> VerifyResult<EndOfCentralDirectory> {
        let offset = self.find_eocd()?;

        // Signature(4), disk number(2), disk with CD(2), disk entries(2)
        let (total_entries, at) = self.reader.read_u16(offset + 10)?;
        let at = self.reader.skip(at, 4)?; // CD size
        let (cd_offset, at) = self.reader.read_u32(at)?;
        let (comment_len, at) = self.reader.read_u16(at)?;
        let (comment, end) = self.reader.read_string(at, comment_len as usize)?;

        if end != self.reader.len() {
            debug!(
                trailing = self.reader.len() - end,
                "bytes after end of central directory"
            );
            return Err(VerifyError::BadBlankSpace);
        }

        Ok(EndOfCentralDirectory {
            offset,
            total_entries,
            cd_offset,
            comment_len,
            comment,
        })
    }

    /// Read every Central Directory record.
    ///
    /// The returned entries have `header_size == 0`; see
    /// [`resolve_local_headers`](Self::resolve_local_headers).
    pub fn read_central_directory(
        &self,
        eocd: &EndOfCentralDirectory,
    ) -> VerifyResult<Vec<ZipEntry>> {
        let mut entries = Vec::with_capacity(eocd.total_entries as usize);
        let mut at = eocd.cd_offset as usize;

        for _ in 0..eocd.total_entries {
            let (entry, next) = self.parse_cdfh(at)?;
            entries.push(entry);
            at = next;
        }

        // The directory must end exactly where the EOCD begins
        if at != eocd.offset {
            debug!(
                cd_end = at,
                eocd_offset = eocd.offset,
                "central directory does not reach end of central directory"
            );
            return Err(VerifyError::BadBlankSpace);
        }

        Ok(entries)
    }

    /// Parse one Central Directory File Header starting at `at`.
    fn parse_cdfh(&self, at: usize) -> VerifyResult<(ZipEntry, usize)> {
        if !self.reader.has_signature(at, CDFH_SIGNATURE) {
            debug!(offset = at, "missing central directory signature");
            return Err(VerifyError::BadContainer);
        }

        // Versions(4), flags(2), method(2), time(2), date(2), CRC-32(4)
        let (compressed_size, next) = self.reader.read_u32(at + 20)?;
        let next = self.reader.skip(next, 4)?; // uncompressed size
        let (file_name_length, next) = self.reader.read_u16(next)?;
        let (extra_field_length, next) = self.reader.read_u16(next)?;
        let (file_comment_length, next) = self.reader.read_u16(next)?;
        let next = self.reader.skip(next, 8)?; // disk start, attributes
        let (position, next) = self.reader.read_u32(next)?;

        if extra_field_length > MAX_EXTRA_LENGTH {
            return Err(VerifyError::ExtraFieldTooLarge);
        }
        if file_comment_length > MAX_FILE_COMMENT_LENGTH {
            return Err(VerifyError::FileCommentTooLarge);
        }

        let (raw_name, next) = self.reader.read_bytes(next, file_name_length as usize)?;
        let next = self
            .reader
            .skip(next, extra_field_length as usize + file_comment_length as usize)?;

        Ok((ZipEntry::new(raw_name, position, compressed_size), next))
    }

    /// Read each entry's Local File Header and check that the entries tile
    /// the file from offset zero up to the Central Directory.
    ///
    /// Returns the entries sorted by position with `header_size` filled in.
    pub fn resolve_local_headers(
        &self,
        mut entries: Vec<ZipEntry>,
        cd_offset: u32,
    ) -> VerifyResult<Vec<ZipEntry>> {
        entries.sort_by_key(|entry| entry.position);

        let mut last_byte = 0usize;
        for entry in &mut entries {
            if entry.position as usize != last_byte {
                debug!(
                    file_name = %entry.file_name,
                    position = entry.position,
                    expected = last_byte,
                    "gap or overlap before entry"
                );
                return Err(VerifyError::BadBlankSpace);
            }

            let (header_size, flags) = self.read_local_header(entry.position as usize)?;
            entry.header_size = header_size;

            last_byte = entry
                .data_offset()
                .checked_add(entry.compressed_size as usize)
                .ok_or(VerifyError::BadContainer)?;

            if flags & FLAG_DATA_DESCRIPTOR != 0 {
                last_byte += if self.reader.has_signature(last_byte, DATA_DESCRIPTOR_SIGNATURE) {
                    DATA_DESCRIPTOR_SIGNED_SIZE
                } else {
                    DATA_DESCRIPTOR_SIZE
                };
            }
        }

        self.check_signing_block(last_byte, cd_offset as usize)?;
        Ok(entries)
    }

    /// Read a Local File Header, returning its total size and general
    /// purpose flags.
    fn read_local_header(&self, position: usize) -> VerifyResult<(u32, u16)> {
        if !self.reader.has_signature(position, LFH_SIGNATURE) {
            debug!(offset = position, "missing local file header signature");
            return Err(VerifyError::BadContainer);
        }

        let (flags, _) = self.reader.read_u16(position + 6)?;
        let (file_name_length, next) = self.reader.read_u16(position + 26)?;
        let (extra_field_length, _) = self.reader.read_u16(next)?;

        if extra_field_length > MAX_EXTRA_LENGTH {
            return Err(VerifyError::ExtraFieldTooLarge);
        }

        let header_size = LFH_SIZE as u32 + file_name_length as u32 + extra_field_length as u32;
        Ok((header_size, flags))
    }

    /// Accept the space between the last entry and the Central Directory only
    /// when it is a bounded signing block.
    fn check_signing_block(&self, last_byte: usize, cd_offset: usize) -> VerifyResult<()> {
        if last_byte == cd_offset {
            return Ok(());
        }
        if last_byte > cd_offset {
            debug!(last_byte, cd_offset, "entry data overlaps central directory");
            return Err(VerifyError::BadBlankSpace);
        }

        // The magic must sit entirely inside the gap
        let magic_start = cd_offset
            .checked_sub(SIGNING_BLOCK_MAGIC.len())
            .filter(|&start| start >= last_byte);
        let magic = match magic_start {
            Some(start) => self.reader.read_bytes(start, SIGNING_BLOCK_MAGIC.len())?.0,
            None => &[][..],
        };
        if magic != SIGNING_BLOCK_MAGIC {
            debug!(gap = cd_offset - last_byte, "unexplained gap before central directory");
            return Err(VerifyError::BadBlankSpace);
        }

        if cd_offset - last_byte > MAX_SIGNING_BLOCK_SIZE {
            debug!(size = cd_offset - last_byte, "signing block too large");
            return Err(VerifyError::BadSigningBlock);
        }

        Ok(())
    }

    /// Parse the whole container skeleton: EOCD, Central Directory and Local
    /// File Headers. Entries come back in file order.
    pub fn list_entries(&self) -> VerifyResult<(EndOfCentralDirectory, Vec<ZipEntry>)> {
        let eocd = self.read_eocd()?;
        let entries = self.read_entries(&eocd)?;
        Ok((eocd, entries))
    }

    /// Central Directory plus Local File Header pass for an already parsed EOCD.
    pub fn read_entries(&self, eocd: &EndOfCentralDirectory) -> VerifyResult<Vec<ZipEntry>> {
        let entries = self.read_central_directory(eocd)?;
        self.resolve_local_headers(entries, eocd.cd_offset)
    }
}
