//! Depot manifest: header, item table and name block
//!
//! All integers are little-endian `u32`.
//!
//! | Section | Offset | Size |
//! |---------|--------|------|
//! | Header | 0 | 56 bytes, 14 fields |
//! | Item table | 56 | `numItems * 28` bytes |
//! | Name block | `56 + numItems * 28` | NUL-terminated names at `nameOffset` |
//!
//! Items form a forest through `parentIndex`; roots carry [`NO_PARENT`].

mod error;
mod header;
mod item;
mod parser;
mod sanitize;

pub use error::{ManifestError, ManifestResult};
pub use header::ManifestHeader;
pub use item::{FILE_TYPE_BIT, ManifestItem};
pub use parser::ManifestParser;
pub use sanitize::{RESERVED_CHARS, sanitize_file_name};

use std::io::Cursor;

use serde::Serialize;

/// Size of the manifest header
pub const HEADER_SIZE: u64 = 56;

/// Size of one item table record
pub const ITEM_SIZE: u64 = 28;

/// Parent index marking a root item
pub const NO_PARENT: u32 = 0xFFFF_FFFF;

/// Bytes read when looking for a name's terminator
pub const NAME_PROBE_LEN: usize = 256;

/// Parsed manifest with resolved paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Header fields
    #[serde(flatten)]
    pub header: ManifestHeader,
    /// Items in table order
    pub items: Vec<ManifestItem>,
}

impl Manifest {
    /// Parse an in-memory manifest without name sanitizing
    pub fn parse(data: &[u8]) -> ManifestResult<Self> {
        ManifestParser::new().parse(Cursor::new(data))
    }

    /// Depot id used to look up the decryption key
    pub fn depot_id(&self) -> u32 {
        self.header.depot_id
    }

    /// Item at `index`
    pub fn get(&self, index: usize) -> Option<&ManifestItem> {
        self.items.get(index)
    }

    /// File items in table order
    pub fn files(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.iter().filter(|item| item.is_file())
    }

    /// Directory items in table order
    pub fn directories(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.iter().filter(|item| item.is_directory())
    }

    /// Items whose parent is `index`
    pub fn children(&self, index: usize) -> impl Iterator<Item = &ManifestItem> {
        self.items
            .iter()
            .filter(move |item| item.parent() == Some(index))
    }

    /// Item with the given resolved path
    pub fn find(&self, path: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.path == path)
    }
}
