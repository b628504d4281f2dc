//! Lookup trait for depot key storage
//!
//! Segment preparation only needs to ask "which key belongs to this depot";
//! anything that can answer that can back decryption.

use std::collections::HashMap;

use crate::keys::DepotKeyStore;

/// Trait for depot key lookup backends
pub trait DepotKeyProvider {
    /// Get the raw key for a depot, if one is known
    fn lookup(&self, depot_id: u32) -> Option<&[u8]>;

    /// Check if a key exists for a depot
    fn contains(&self, depot_id: u32) -> bool {
        self.lookup(depot_id).is_some()
    }
}

impl DepotKeyProvider for DepotKeyStore {
    fn lookup(&self, depot_id: u32) -> Option<&[u8]> {
        self.get(depot_id)
    }
}

impl DepotKeyProvider for HashMap<u32, Vec<u8>> {
    fn lookup(&self, depot_id: u32) -> Option<&[u8]> {
        self.get(&depot_id).map(Vec::as_slice)
    }
}

impl<P: DepotKeyProvider + ?Sized> DepotKeyProvider for &P {
    fn lookup(&self, depot_id: u32) -> Option<&[u8]> {
        (**self).lookup(depot_id)
    }
}
