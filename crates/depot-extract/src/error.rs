//! Error types for the extractor.

use std::path::PathBuf;

use depot_formats::segment::SegmentError;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input file does not exist
    #[error("{what} file not found: {}", path.display())]
    MissingInput {
        /// Which input
        what: &'static str,
        /// Path that was given
        path: PathBuf,
    },
}

/// Errors raised while writing files out.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Item path would escape the output directory
    #[error("Refusing unsafe item path: {0:?}")]
    UnsafePath(String),

    /// Manifest file has no index record
    #[error("No index record {id} for {path}")]
    MissingIndexRecord {
        /// Manifest path of the file
        path: String,
        /// File id from the manifest
        id: u32,
    },

    /// Preparing, reading or closing the file failed
    #[error("Failed to decode {path}: {source}")]
    Decode {
        /// Manifest path of the file
        path: String,
        /// Underlying decode error
        #[source]
        source: SegmentError,
    },

    /// Reading decoded bytes or writing them out failed
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for extraction results
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
