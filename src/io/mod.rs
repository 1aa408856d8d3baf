mod local;

pub use local::LocalFileReader;

use anyhow::{bail, Result};
use std::path::Path;

/// Largest package accepted. Entry offsets are 32-bit, so nothing larger
/// can be a valid container.
pub const MAX_PACKAGE_SIZE: u64 = u32::MAX as u64;

/// Trait for random access reading from a data source
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}

impl ReadAt for [u8] {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = usize::try_from(offset)?.min(self.len());
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

/// Materialize a whole source in memory.
///
/// Blocking for file-backed sources: call it off latency-sensitive threads.
pub fn read_fully<R: ReadAt + ?Sized>(reader: &R) -> Result<Vec<u8>> {
    let size = reader.size();
    if size > MAX_PACKAGE_SIZE {
        bail!("Package too large: {} bytes", size);
    }

    let mut buf = vec![0u8; size as usize];
    let mut filled = 0usize;
    while filled < buf.len() {
        let n = reader.read_at(filled as u64, &mut buf[filled..])?;
        if n == 0 {
            bail!("Unexpected end of data at offset {}", filled);
        }
        filled += n;
    }

    Ok(buf)
}

/// Read the package file at `path`.
pub fn read_package(path: &Path) -> Result<Vec<u8>> {
    read_fully(&LocalFileReader::new(path)?)
}
