//! Depot encryption key management
//!
//! Keys are identified by the numeric depot id they belong to. The on-disk
//! key file is a JSON object of the form:
//!
//! ```json
//! { "keys": { "<depotId>": "<hex-encoded key>" } }
//! ```
//!
//! Key bytes are kept as given; the length is only checked when a cipher is
//! created from them.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use serde::Deserialize;
use tracing::debug;

use crate::error::CryptoError;

/// A depot encryption key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepotKey {
    /// Depot identifier
    pub depot_id: u32,
    /// Raw AES key bytes
    pub key: Vec<u8>,
}

impl DepotKey {
    /// Create a new depot key
    pub fn new(depot_id: u32, key: Vec<u8>) -> Self {
        Self { depot_id, key }
    }

    /// Parse key from hex string
    pub fn from_hex(depot_id: u32, hex: &str) -> Result<Self, CryptoError> {
        let key = hex::decode(hex.trim())
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("invalid hex: {e}")))?;
        Ok(Self::new(depot_id, key))
    }
}

impl fmt::Display for DepotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.depot_id, hex::encode_upper(&self.key))
    }
}

/// Raw shape of a key file
#[derive(Debug, Deserialize)]
struct KeyFile {
    keys: HashMap<String, String>,
}

/// Store for depot encryption keys
#[derive(Debug, Clone, Default)]
pub struct DepotKeyStore {
    keys: HashMap<u32, Vec<u8>>,
}

impl DepotKeyStore {
    /// Create an empty key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a key file from a JSON string
    ///
    /// Any malformed depot id or key fails the whole load.
    pub fn from_json(content: &str) -> Result<Self, CryptoError> {
        let file: KeyFile = serde_json::from_str(content)?;
        Self::from_key_file(file)
    }

    /// Parse a key file from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CryptoError> {
        let file: KeyFile = serde_json::from_reader(reader)?;
        Self::from_key_file(file)
    }

    fn from_key_file(file: KeyFile) -> Result<Self, CryptoError> {
        let mut store = Self::new();
        for (depot, hex) in &file.keys {
            let depot_id = parse_depot_id(depot)?;
            store.add(DepotKey::from_hex(depot_id, hex)?);
        }
        debug!("Loaded {} depot keys", store.len());
        Ok(store)
    }

    /// Get a key by depot id
    pub fn get(&self, depot_id: u32) -> Option<&[u8]> {
        self.keys.get(&depot_id).map(Vec::as_slice)
    }

    /// Add a key to the store, replacing any key for the same depot
    pub fn add(&mut self, key: DepotKey) {
        self.keys.insert(key.depot_id, key.key);
    }

    /// Remove a key from the store
    pub fn remove(&mut self, depot_id: u32) -> Option<Vec<u8>> {
        self.keys.remove(&depot_id)
    }

    /// Get the number of keys in the store
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over all keys
    pub fn iter(&self) -> impl Iterator<Item = DepotKey> + '_ {
        self.keys
            .iter()
            .map(|(&depot_id, key)| DepotKey::new(depot_id, key.clone()))
    }
}

/// Parse a decimal depot id
fn parse_depot_id(s: &str) -> Result<u32, CryptoError> {
    s.trim().parse().map_err(|e| CryptoError::InvalidDepotId {
        id: s.to_string(),
        reason: format!("{e}"),
    })
}
