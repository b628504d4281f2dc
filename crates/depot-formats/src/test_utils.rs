//! Test utilities for building synthetic depots
//!
//! The crate is decode-only, so fixtures are assembled here byte by byte.

use crate::manifest::{HEADER_SIZE, ITEM_SIZE, NO_PARENT};
use crate::segment::{Mode, SIZE_HINTS_LEN};
use depot_crypto::aes_cfb::encrypt_in_place;
use flate2::Compression;
use flate2::read::ZlibEncoder;
use std::io::Read;

/// AES-128 key used by encrypted fixtures
pub const TEST_KEY: &[u8] = b"depot-test-key!!";

/// Item type value with the file bit set
pub const FILE_TYPE: u32 = 0x4000;

/// Item type value for a directory
pub const DIR_TYPE: u32 = 0;

/// Compress `data` into a zlib stream
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(data, Compression::default());
    let mut compressed = Vec::new();
    encoder
        .read_to_end(&mut compressed)
        .expect("in-memory compression");
    compressed
}

/// Encode `plain` the way a producer would for `mode`
pub fn encode_payload(plain: &[u8], mode: Mode, key: &[u8]) -> Vec<u8> {
    match mode {
        Mode::Raw => plain.to_vec(),
        Mode::Compressed => zlib(plain),
        Mode::Encrypted => {
            let mut data = plain.to_vec();
            encrypt_in_place(key, &mut data).expect("valid test key");
            data
        }
        Mode::EncryptedCompressed => {
            let mut body = zlib(plain);
            let mut payload = Vec::with_capacity(SIZE_HINTS_LEN as usize + body.len());
            payload.extend_from_slice(&(body.len() as u32).to_le_bytes());
            payload.extend_from_slice(&(plain.len() as u32).to_le_bytes());
            encrypt_in_place(key, &mut body).expect("valid test key");
            payload.extend_from_slice(&body);
            payload
        }
    }
}

/// Encode one index record with its segment table
pub fn index_record(id: u64, mode: u64, segments: &[(u64, u64)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&id.to_be_bytes());
    data.extend_from_slice(&(segments.len() as u64 * 16).to_be_bytes());
    data.extend_from_slice(&mode.to_be_bytes());
    for (offset, length) in segments {
        data.extend_from_slice(&offset.to_be_bytes());
        data.extend_from_slice(&length.to_be_bytes());
    }
    data
}

/// Manifest item as written by [`manifest_bytes`]
pub struct FixtureItem<'a> {
    pub name: &'a str,
    pub size: u32,
    pub id: u32,
    pub item_type: u32,
    pub parent: u32,
}

impl<'a> FixtureItem<'a> {
    pub fn dir(name: &'a str, parent: u32) -> Self {
        Self {
            name,
            size: 0,
            id: 0,
            item_type: DIR_TYPE,
            parent,
        }
    }

    pub fn file(name: &'a str, id: u32, size: u32, parent: u32) -> Self {
        Self {
            name,
            size,
            id,
            item_type: FILE_TYPE,
            parent,
        }
    }

    pub fn root() -> Self {
        Self::dir("", NO_PARENT)
    }
}

/// Build a complete manifest: header, item table and name block
pub fn manifest_bytes(depot_id: u32, items: &[FixtureItem<'_>]) -> Vec<u8> {
    let mut names = Vec::new();
    let mut table = Vec::with_capacity(items.len() * ITEM_SIZE as usize);
    for item in items {
        let name_offset = names.len() as u32;
        names.extend_from_slice(item.name.as_bytes());
        names.push(0);

        for field in [
            name_offset,
            item.size,
            item.id,
            item.item_type,
            item.parent,
            NO_PARENT,
            NO_PARENT,
        ] {
            table.extend_from_slice(&field.to_le_bytes());
        }
    }

    let num_files = items.iter().filter(|i| i.item_type & FILE_TYPE != 0).count() as u32;
    let header = [
        0,
        depot_id,
        1,
        items.len() as u32,
        num_files,
        0x2000,
        table.len() as u32,
        names.len() as u32,
        0,
        0,
        0,
        0,
        0,
        0xDEAD_BEEF,
    ];

    let mut data = Vec::with_capacity(HEADER_SIZE as usize + table.len() + names.len());
    for field in header {
        data.extend_from_slice(&field.to_le_bytes());
    }
    data.extend_from_slice(&table);
    data.extend_from_slice(&names);
    data
}
