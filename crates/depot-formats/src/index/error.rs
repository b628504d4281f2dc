//! Error types for index parsing

use thiserror::Error;

/// Errors that can occur when parsing an index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Input ended inside a record header
    #[error("Truncated record header: {read} of 24 bytes")]
    TruncatedHeader {
        /// Bytes of the header that were present
        read: usize,
    },

    /// Segment table shorter than the header announced, or not a whole
    /// number of segment pairs
    #[error("Truncated segment table for file {id}: {reason}")]
    TruncatedSegmentTable {
        /// File id of the record
        id: u64,
        /// What was missing
        reason: String,
    },

    /// Mode value outside the known set
    #[error("Unknown mode {mode} for file {id}")]
    UnknownMode {
        /// File id of the record
        id: u64,
        /// Raw mode value
        mode: u64,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Type alias for index parsing results
pub type IndexResult<T> = std::result::Result<T, IndexError>;
