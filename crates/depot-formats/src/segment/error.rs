//! Segment decode error types

use depot_crypto::CryptoError;
use thiserror::Error;

/// Segment and file decode error type
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Reading the encoded bytes from the data blob failed
    #[error("failed to read data: {length} bytes at offset {offset}: {source}")]
    ReadData {
        /// Segment offset in the blob
        offset: u64,
        /// Segment length in the blob
        length: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Segment length does not fit in memory on this platform
    #[error("segment too large: {0} bytes")]
    TooLarge(u64),

    /// Read attempted on a stream that is not prepared or already closed
    #[error("segment not prepared")]
    NotPrepared,

    /// Encrypted mode without a key
    #[error("missing decryption key")]
    MissingKey,

    /// Encrypted-compressed payload shorter than its size hint prefix
    #[error("segment of {0} bytes is too short for its size hints")]
    TruncatedSizeHints(u64),

    /// Cipher could not be created from the key
    #[error("failed to create aes cipher: {0}")]
    CipherInit(#[source] CryptoError),

    /// Payload does not start with a usable zlib header
    #[error("failed to create zlib reader: {0}")]
    DecompressionInit(String),

    /// Zlib stream is corrupt
    #[error("decompression failed: {0}")]
    Decompression(#[source] std::io::Error),
}

impl SegmentError {
    /// Extract a segment error carried inside an I/O error
    ///
    /// Prepared streams implement [`std::io::Read`], so decode failures
    /// surface as I/O errors wrapping a `SegmentError`.
    pub fn from_io(err: &std::io::Error) -> Option<&Self> {
        err.get_ref().and_then(|inner| inner.downcast_ref::<Self>())
    }

    pub(crate) fn into_io(self) -> std::io::Error {
        let kind = match &self {
            Self::Decompression(e) => e.kind(),
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, self)
    }
}

/// Result type for segment operations
pub type SegmentResult<T> = Result<T, SegmentError>;
