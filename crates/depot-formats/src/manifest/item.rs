//! Manifest item records

use binrw::BinRead;
use serde::Serialize;

use super::NO_PARENT;

/// Type bit set on file items
pub const FILE_TYPE_BIT: u32 = 0x4000;

/// One node of the manifest tree
///
/// The seven numeric fields are read from the item table. `name` comes from
/// the name block and `path` is filled once every item has been loaded.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, Serialize)]
#[br(little)]
#[serde(rename_all = "camelCase")]
pub struct ManifestItem {
    /// Offset of the name within the name block
    pub name_offset: u32,
    /// Logical size in bytes
    pub size: u32,
    /// File id, matching an index record for files
    pub id: u32,
    /// Type flags
    #[serde(rename = "type")]
    pub item_type: u32,
    /// Position of the parent item, or [`NO_PARENT`]
    pub parent_index: u32,
    /// Position of the next sibling
    pub next_index: u32,
    /// Position of the first child
    pub first_index: u32,

    /// Name from the name block
    #[br(ignore)]
    pub name: String,
    /// `/`-joined names from the root down to this item
    #[br(ignore)]
    pub path: String,
}

impl ManifestItem {
    /// Whether the item is a directory
    pub fn is_directory(&self) -> bool {
        self.item_type & FILE_TYPE_BIT == 0
    }

    /// Whether the item is a file
    pub fn is_file(&self) -> bool {
        !self.is_directory()
    }

    /// Position of the parent item, `None` for roots
    pub fn parent(&self) -> Option<usize> {
        (self.parent_index != NO_PARENT).then_some(self.parent_index as usize)
    }
}
