//! ZIP container parsing for signature verification.
//!
//! This module reads just enough of a ZIP archive to know which bytes a
//! signature covers, and rejects any archive whose layout could hide data
//! from that signature.
//!
//! ## Architecture
//!
//! - [`structures`]: format constants, size limits and parsed records
//! - [`reader`]: bounds-checked little-endian reads with an explicit cursor
//! - [`parser`]: EOCD, Central Directory and Local File Header validation
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. An optional APK signing block
//! 3. Central Directory with metadata for all files
//! 4. End of Central Directory (EOCD) record at the end
//!
//! ## Limitations
//!
//! - No ZIP64 support
//! - No multi-disk archive support
//! - Compressed data is never inflated; signatures cover it as stored

mod parser;
mod reader;
mod structures;

pub use parser::ZipParser;
pub use reader::ByteReader;
pub use structures::*;
