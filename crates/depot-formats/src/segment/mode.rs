//! Segment encoding modes

use serde::Serialize;

/// Encoding stages applied to every segment of a file
///
/// When both stages are present, decryption always runs before
/// decompression.
///
/// Serializes as its on-disk value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u64")]
#[repr(u8)]
pub enum Mode {
    /// Payload is the logical bytes
    Raw = 0,
    /// Payload is a zlib stream
    Compressed = 1,
    /// Payload is 8 bytes of size hints followed by AES-CFB ciphertext of a zlib stream
    EncryptedCompressed = 2,
    /// Payload is AES-CFB ciphertext of the logical bytes
    Encrypted = 3,
}

impl From<Mode> for u64 {
    fn from(mode: Mode) -> Self {
        mode.as_value()
    }
}

impl Mode {
    /// Parse from the on-disk mode value
    pub fn from_value(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Raw),
            1 => Some(Self::Compressed),
            2 => Some(Self::EncryptedCompressed),
            3 => Some(Self::Encrypted),
            _ => None,
        }
    }

    /// Get the on-disk mode value
    pub fn as_value(self) -> u64 {
        self as u64
    }

    /// Whether segments need a key to decode
    pub fn is_encrypted(self) -> bool {
        matches!(self, Self::Encrypted | Self::EncryptedCompressed)
    }

    /// Whether segments carry a zlib stream
    pub fn is_compressed(self) -> bool {
        matches!(self, Self::Compressed | Self::EncryptedCompressed)
    }

    /// Whether segments start with the 8-byte size hint prefix
    pub fn has_size_hints(self) -> bool {
        self == Self::EncryptedCompressed
    }
}
