//! Binary index of logical files
//!
//! The index is a stream of records with no header or count. Every integer
//! is a big-endian `u64`:
//!
//! ```text
//! id | table length | mode | (offset, length) * n
//! ```
//!
//! Parsing stops cleanly when the input ends on a record boundary.

mod error;
mod parser;

pub use error::{IndexError, IndexResult};
pub use parser::{IndexLayout, IndexParser, RECORD_HEADER_SIZE, SEGMENT_PAIR_SIZE};

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;

use crate::segment::LogicalFile;

/// Logical files keyed by file id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DepotIndex {
    files: BTreeMap<u64, LogicalFile>,
}

impl DepotIndex {
    /// Parse an in-memory index with the default layout
    pub fn parse(data: &[u8]) -> IndexResult<Self> {
        IndexParser::new().parse(data)
    }

    /// Look up a file by id
    pub fn get(&self, id: u64) -> Option<&LogicalFile> {
        self.files.get(&id)
    }

    /// Whether `id` has a record
    pub fn contains(&self, id: u64) -> bool {
        self.files.contains_key(&id)
    }

    /// Insert a file, returning the one it replaced
    pub fn insert(&mut self, id: u64, file: LogicalFile) -> Option<LogicalFile> {
        self.files.insert(id, file)
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the index has no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate files in ascending id order
    pub fn iter(&self) -> btree_map::Iter<'_, u64, LogicalFile> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a DepotIndex {
    type Item = (&'a u64, &'a LogicalFile);
    type IntoIter = btree_map::Iter<'a, u64, LogicalFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
