//! Data blob access.

use std::fs::File;
use std::io;
use std::path::Path;

use depot_formats::BlobSource;
use memmap2::{Mmap, MmapOptions};
use tracing::debug;

/// Data blob opened for random-access reads.
///
/// The file is memory-mapped when possible; empty files and files the
/// platform refuses to map are read through positioned file reads instead.
#[derive(Debug)]
pub enum DataBlob {
    /// Memory-mapped file
    Mapped(Mmap),
    /// Plain file handle
    File(File),
}

impl DataBlob {
    /// Open the data blob at `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        if size == 0 {
            return Ok(Self::File(file));
        }

        #[allow(unsafe_code)]
        let mapped = unsafe { MmapOptions::new().map(&file) };
        match mapped {
            Ok(mmap) => {
                debug!("Memory-mapped data blob {:?} ({} bytes)", path, size);
                Ok(Self::Mapped(mmap))
            }
            Err(e) => {
                debug!("Failed to memory-map data blob, using file reads: {}", e);
                Ok(Self::File(file))
            }
        }
    }

    /// Whether the blob is memory-mapped.
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }
}

impl BlobSource for DataBlob {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        match self {
            Self::Mapped(mmap) => mmap[..].read_exact_at(buf, offset),
            Self::File(file) => file.read_exact_at(buf, offset),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, b"0123456789").unwrap();

        let blob = DataBlob::open(&path).unwrap();
        let mut buf = [0u8; 3];
        blob.read_exact_at(&mut buf, 7).unwrap();
        assert_eq!(&buf, b"789");

        let err = blob.read_exact_at(&mut buf, 8).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_empty_blob_is_not_mapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        let blob = DataBlob::open(&path).unwrap();
        assert!(!blob.is_mapped());
        blob.read_exact_at(&mut [], 0).unwrap();
    }
}
