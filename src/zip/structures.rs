/// End of Central Directory (EOCD) - 22 bytes minimum
pub const EOCD_SIGNATURE: u32 = 0x0605_4b50;
pub const EOCD_MIN_SIZE: usize = 22;

/// Maximum ZIP comment size allowed by the format, plus the fixed EOCD part.
///
/// This bounds the backward search for the EOCD record.
pub const EOCD_MAX_SIZE: usize = 64 * 1024 + EOCD_MIN_SIZE;

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: u32 = 0x0201_4b50;
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: u32 = 0x0403_4b50;
pub const LFH_SIZE: usize = 30;

/// Data descriptor, optionally preceded by its own signature.
pub const DATA_DESCRIPTOR_SIGNATURE: u32 = 0x0807_4b50;
pub const DATA_DESCRIPTOR_SIZE: usize = 12;
pub const DATA_DESCRIPTOR_SIGNED_SIZE: usize = 16;

/// General purpose flag bit 3: sizes follow the data in a descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// Largest extra field accepted in central or local headers.
pub const MAX_EXTRA_LENGTH: u16 = 8;

/// Largest per-entry comment accepted in the central directory.
pub const MAX_FILE_COMMENT_LENGTH: u16 = 0;

/// Magic string ending an APK signing block, right before the central directory.
pub const SIGNING_BLOCK_MAGIC: &[u8; 16] = b"APK Sig Block 42";

/// Largest tolerated gap between the last entry and the central directory.
pub const MAX_SIGNING_BLOCK_SIZE: usize = 8192 * 2;

/// End of Central Directory record as needed for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Offset of the `PK\x05\x06` signature in the file.
    pub offset: usize,
    pub total_entries: u16,
    pub cd_offset: u32,
    pub comment_len: u16,
    /// Archive comment, decoded lossily as UTF-8.
    pub comment: String,
}

/// A file stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    /// Name as stored in the Central Directory. This is what gets signed.
    pub raw_name: Vec<u8>,
    /// `raw_name` decoded lossily as UTF-8, for display.
    pub file_name: String,
    /// Offset of the local file header.
    pub position: u32,
    /// Size of the local file header including name and extra field.
    ///
    /// Zero until the local header has been read.
    pub header_size: u32,
    pub compressed_size: u32,
}

impl ZipEntry {
    pub fn new(raw_name: &[u8], position: u32, compressed_size: u32) -> Self {
        Self {
            raw_name: raw_name.to_vec(),
            file_name: String::from_utf8_lossy(raw_name).into_owned(),
            position,
            header_size: 0,
            compressed_size,
        }
    }

    /// Offset of the first byte of compressed data.
    pub fn data_offset(&self) -> usize {
        self.position as usize + self.header_size as usize
    }
}
