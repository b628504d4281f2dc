//! Error types for cryptographic operations

use thiserror::Error;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key length does not select an AES variant
    #[error("Unsupported key size: {0} bytes (expected 16, 24 or 32)")]
    UnsupportedKeySize(usize),

    /// Invalid key format
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Depot identifier in a key file is not a decimal integer
    #[error("Invalid depot id '{id}': {reason}")]
    InvalidDepotId {
        /// The offending identifier as written in the key file
        id: String,
        /// Parse failure description
        reason: String,
    },

    /// Key file is not valid JSON or has the wrong shape
    #[error("Invalid key file: {0}")]
    KeyFile(#[from] serde_json::Error),

    /// I/O error while reading a key file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
