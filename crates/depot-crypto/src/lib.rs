//! Cryptographic operations for depot archives
//!
//! This crate provides the key material and cipher primitives needed to
//! decode encrypted depot segments.
//!
//! # Components
//!
//! - **Key Management**: depot id to raw AES key lookup, loaded from a JSON key file
//! - **Encryption**: AES in full-block CFB mode with the fixed all-zero IV used by depot content
//!
//! # Key Storage
//!
//! - [`DepotKeyStore`] - In-memory storage loaded from a key file
//! - [`DepotKeyProvider`] - Lookup trait consumed by segment preparation
//!
//! # Examples
//!
//! ## Loading a Key File
//!
//! ```
//! use depot_crypto::{DepotKeyProvider, DepotKeyStore};
//!
//! let json = r#"{"keys": {"1001": "000102030405060708090a0b0c0d0e0f"}}"#;
//! let store = DepotKeyStore::from_json(json).expect("valid key file");
//!
//! assert_eq!(store.lookup(1001).map(<[u8]>::len), Some(16));
//! assert!(store.lookup(1002).is_none());
//! ```
//!
//! ## Decrypting a Stream
//!
//! ```
//! use depot_crypto::aes_cfb::{AesCfbReader, encrypt_in_place};
//! use std::io::Read;
//!
//! let key = [0x42u8; 16];
//! let mut data = b"depot payload".to_vec();
//! encrypt_in_place(&key, &mut data).expect("valid key");
//!
//! let mut reader = AesCfbReader::new(data.as_slice(), &key).expect("valid key");
//! let mut plain = Vec::new();
//! reader.read_to_end(&mut plain).expect("in-memory read");
//! assert_eq!(plain, b"depot payload");
//! ```

#![warn(missing_docs)]

pub mod aes_cfb;
pub mod error;
pub mod keys;
pub mod store_trait;

pub use error::CryptoError;

// Re-export commonly used types
pub use aes_cfb::AesCfbReader;
pub use keys::{DepotKey, DepotKeyStore};
pub use store_trait::DepotKeyProvider;
