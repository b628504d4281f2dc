//! Manifest header parsing

use binrw::BinRead;
use serde::Serialize;

/// Manifest header: 14 little-endian `u32` fields
///
/// Only `num_items` drives parsing. The rest is carried through for
/// callers and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, Serialize)]
#[br(little)]
#[serde(rename_all = "camelCase")]
pub struct ManifestHeader {
    /// Unused leading field
    pub dummy1: u32,
    /// Depot identifier, also the key table lookup id
    #[serde(rename = "depotID")]
    pub depot_id: u32,
    /// Depot version
    pub depot_version: u32,
    /// Number of records in the item table
    pub num_items: u32,
    /// Number of file items
    pub num_files: u32,
    /// Block size of the depot data
    pub block_size: u32,
    /// Item table size in bytes
    pub dir_size: u32,
    /// Name block size in bytes
    pub dir_name_size: u32,
    /// Info record count
    pub info_count: u32,
    /// Copy record count
    pub copy_count: u32,
    /// Local record count
    pub local_count: u32,
    /// Unused field
    pub dummy2: u32,
    /// Unused field
    pub dummy3: u32,
    /// Header checksum, not verified
    pub checksum: u32,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use binrw::io::Cursor;

    #[test]
    fn test_header_little_endian() {
        let mut data = Vec::new();
        for field in 1u32..=14 {
            data.extend_from_slice(&field.to_le_bytes());
        }

        let header = ManifestHeader::read(&mut Cursor::new(&data)).unwrap();
        assert_eq!(header.dummy1, 1);
        assert_eq!(header.depot_id, 2);
        assert_eq!(header.num_items, 4);
        assert_eq!(header.dir_name_size, 8);
        assert_eq!(header.checksum, 14);
    }

    #[test]
    fn test_header_json_names() {
        let header = ManifestHeader {
            depot_id: 228_988,
            num_items: 3,
            ..ManifestHeader::default()
        };
        let json = serde_json::to_value(header).unwrap();
        assert_eq!(json["depotID"], 228_988);
        assert_eq!(json["numItems"], 3);
        assert_eq!(json["dirNameSize"], 0);
    }
}
