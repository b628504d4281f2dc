//! Error types for manifest parsing

use thiserror::Error;

/// Errors that can occur when parsing a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Item table extends past the end of the manifest
    #[error("Item table for {num_items} items does not fit in {stream_len} bytes")]
    ItemTableOutOfBounds {
        /// Item count from the header
        num_items: u32,
        /// Total manifest length
        stream_len: u64,
    },

    /// No NUL terminator within the name probe
    #[error("Unterminated name for item {index}")]
    MalformedName {
        /// Position of the item in the table
        index: usize,
    },

    /// Parent link points outside the item table
    #[error("Item {index} has parent {parent} outside the item table")]
    ParentOutOfRange {
        /// Position of the item whose link is bad
        index: usize,
        /// Raw parent index
        parent: u32,
    },

    /// Parent links loop back on themselves
    #[error("Parent chain of item {index} forms a cycle")]
    ParentCycle {
        /// Position of the item whose chain never reaches a root
        index: usize,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Type alias for manifest parsing results
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;
