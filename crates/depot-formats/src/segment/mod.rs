//! Segment decode pipeline
//!
//! A [`Segment`] is a contiguous byte range of the data blob. A
//! [`LogicalFile`] is an ordered list of segments sharing one [`Mode`].
//!
//! Both are plain descriptors produced by the index parser. Decoding is
//! two-phase: `prepare` reads the encoded bytes and returns a reader that
//! owns the decoder chain, leaving the descriptor untouched.
//!
//! # Payload Layout
//!
//! | Mode | Layout |
//! |------|--------|
//! | `Raw` | logical bytes |
//! | `Compressed` | zlib stream |
//! | `Encrypted` | AES-CFB ciphertext of the logical bytes |
//! | `EncryptedCompressed` | two LE `u32` size hints, then AES-CFB ciphertext of a zlib stream |
//!
//! Encryption uses a zero IV for every segment. The size hints are skipped,
//! never interpreted.

mod error;
mod file;
mod mode;
mod reader;

pub use error::{SegmentError, SegmentResult};
pub use file::{FileReader, LogicalFile};
pub use mode::Mode;
pub use reader::SegmentReader;

use std::io::Cursor;

use binrw::BinRead;
use serde::Serialize;
use tracing::trace;

use crate::BlobSource;

/// Size of the plaintext size hint prefix in `EncryptedCompressed` payloads
pub const SIZE_HINTS_LEN: u64 = 8;

/// One encoded byte range of the data blob
///
/// Stored in the index as a big-endian `(offset, length)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, Serialize)]
#[br(big)]
pub struct Segment {
    /// Byte offset into the data blob
    pub offset: u64,
    /// Encoded byte length; zero is a valid empty segment
    pub length: u64,
}

impl Segment {
    /// Create a new segment descriptor
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Whether the segment is empty
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Read the encoded bytes from `source` and build the decoder chain
    ///
    /// Zero-length segments succeed without touching `source`.
    pub fn prepare<S: BlobSource + ?Sized>(
        &self,
        key: Option<&[u8]>,
        source: &S,
        mode: Mode,
    ) -> SegmentResult<SegmentReader> {
        if self.is_empty() {
            trace!(offset = self.offset, "Zero-length segment");
            return Ok(SegmentReader::empty());
        }

        let length =
            usize::try_from(self.length).map_err(|_| SegmentError::TooLarge(self.length))?;
        let mut data = Vec::new();
        data.try_reserve_exact(length)
            .map_err(|_| SegmentError::TooLarge(self.length))?;
        data.resize(length, 0);

        source
            .read_exact_at(&mut data, self.offset)
            .map_err(|source| SegmentError::ReadData {
                offset: self.offset,
                length: self.length,
                source,
            })?;

        let mut payload = Cursor::new(data);
        if mode.has_size_hints() {
            let encoded = u32::read_le(&mut payload);
            let decoded = u32::read_le(&mut payload);
            let (Ok(encoded), Ok(decoded)) = (encoded, decoded) else {
                return Err(SegmentError::TruncatedSizeHints(self.length));
            };
            trace!(encoded, decoded, "Skipped segment size hints");
        }

        trace!(
            offset = self.offset,
            length = self.length,
            ?mode,
            "Prepared segment"
        );
        SegmentReader::open(payload, key, mode)
    }
}
