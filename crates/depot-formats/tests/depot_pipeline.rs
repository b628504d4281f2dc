#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! End-to-end decoding of a synthetic depot
//!
//! Builds a blob, index and manifest in memory, then walks the manifest and
//! decodes every file through the index the way an extractor would.

use depot_crypto::DepotKeyStore;
use depot_crypto::aes_cfb::encrypt_in_place;
use depot_formats::BlobSource;
use depot_formats::index::{DepotIndex, IndexLayout, IndexParser};
use depot_formats::manifest::{Manifest, NO_PARENT};
use depot_formats::segment::{Mode, SegmentError};
use flate2::Compression;
use flate2::read::ZlibEncoder;
use pretty_assertions::assert_eq;
use std::io::{Read, Write};
use std::sync::Arc;

const DEPOT_ID: u32 = 228_990;
const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

struct Depot {
    blob: Vec<u8>,
    index: Vec<u8>,
    manifest: Vec<u8>,
    keys: DepotKeyStore,
    expected: Vec<(&'static str, Vec<u8>)>,
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    ZlibEncoder::new(data, Compression::best())
        .read_to_end(&mut out)
        .unwrap();
    out
}

fn encode(plain: &[u8], mode: Mode, key: &[u8]) -> Vec<u8> {
    match mode {
        Mode::Raw => plain.to_vec(),
        Mode::Compressed => zlib(plain),
        Mode::Encrypted => {
            let mut data = plain.to_vec();
            encrypt_in_place(key, &mut data).unwrap();
            data
        }
        Mode::EncryptedCompressed => {
            let mut body = zlib(plain);
            let mut payload = Vec::new();
            payload.extend_from_slice(&(body.len() as u32).to_le_bytes());
            payload.extend_from_slice(&(plain.len() as u32).to_le_bytes());
            encrypt_in_place(key, &mut body).unwrap();
            payload.extend_from_slice(&body);
            payload
        }
    }
}

/// Append a file split into `chunk`-sized segments, returning its index record
fn add_file(
    blob: &mut Vec<u8>,
    id: u64,
    plain: &[u8],
    mode: Mode,
    chunk: usize,
    key: &[u8],
) -> Vec<u8> {
    let mut table = Vec::new();
    for part in plain.chunks(chunk) {
        let payload = encode(part, mode, key);
        table.extend_from_slice(&(blob.len() as u64).to_be_bytes());
        table.extend_from_slice(&(payload.len() as u64).to_be_bytes());
        blob.extend_from_slice(&payload);
    }

    let mut record = Vec::new();
    record.extend_from_slice(&id.to_be_bytes());
    record.extend_from_slice(&(table.len() as u64).to_be_bytes());
    record.extend_from_slice(&mode.as_value().to_be_bytes());
    record.extend_from_slice(&table);
    record
}

/// `(name, id, size, type, parent)`
fn manifest(items: &[(&str, u32, u32, u32, u32)]) -> Vec<u8> {
    let mut names = Vec::new();
    let mut table = Vec::new();
    for (name, id, size, item_type, parent) in items {
        let offset = names.len() as u32;
        names.extend_from_slice(name.as_bytes());
        names.push(0);
        for field in [offset, *size, *id, *item_type, *parent, NO_PARENT, NO_PARENT] {
            table.extend_from_slice(&field.to_le_bytes());
        }
    }

    let mut data = Vec::new();
    let header = [
        0,
        DEPOT_ID,
        3,
        items.len() as u32,
        2,
        0x10000,
        table.len() as u32,
        names.len() as u32,
        0,
        0,
        0,
        0,
        0,
        0,
    ];
    for field in header {
        data.extend_from_slice(&field.to_le_bytes());
    }
    data.extend_from_slice(&table);
    data.extend_from_slice(&names);
    data
}

fn depot() -> Depot {
    let keys = DepotKeyStore::from_json(&format!(
        r#"{{"keys": {{"{DEPOT_ID}": "{KEY_HEX}"}}}}"#
    ))
    .unwrap();
    let key = keys.get(DEPOT_ID).unwrap().to_vec();

    let readme = b"Read me first.\n".repeat(40);
    let level: Vec<u8> = (0..20_000u32).flat_map(|i| (i % 251).to_le_bytes()).collect();
    let empty = Vec::new();

    let mut blob = b"HEAD".to_vec();
    let mut index = Vec::new();
    index.extend(add_file(&mut blob, 10, &readme, Mode::Compressed, 256, &key));
    index.extend(add_file(&mut blob, 11, &level, Mode::EncryptedCompressed, 16_384, &key));
    index.extend(add_file(&mut blob, 12, &empty, Mode::Raw, 1, &key));

    let manifest = manifest(&[
        ("", 0, 0, 0, NO_PARENT),
        ("docs", 0, 0, 0, 0),
        ("README.txt", 10, readme.len() as u32, 0x4000, 1),
        ("maps", 0, 0, 0, 0),
        ("level01.bin", 11, level.len() as u32, 0x4000, 3),
        ("empty.dat", 12, 0, 0x4000, 0),
    ]);

    Depot {
        blob,
        index,
        manifest,
        keys,
        expected: vec![
            ("docs/README.txt", readme),
            ("maps/level01.bin", level),
            ("empty.dat", empty),
        ],
    }
}

fn extract_all<S: BlobSource + ?Sized>(
    depot: &Depot,
    index: &DepotIndex,
    source: &S,
) -> Vec<(String, Vec<u8>)> {
    let manifest = Manifest::parse(&depot.manifest).expect("Manifest should parse");
    manifest
        .files()
        .map(|item| {
            let file = index
                .get(u64::from(item.id))
                .unwrap_or_else(|| panic!("No index record for {}", item.path));
            let mut reader = file
                .prepare_with_keys(&depot.keys, manifest.depot_id(), source)
                .expect("File should prepare");
            let mut content = Vec::new();
            reader.read_to_end(&mut content).expect("File should decode");
            reader.close().expect("File should close");
            assert_eq!(content.len() as u64, u64::from(item.size));
            (item.path.clone(), content)
        })
        .collect()
}

#[test]
fn depot_decodes_every_file() {
    let depot = depot();
    let index = DepotIndex::parse(&depot.index).expect("Index should parse");
    assert_eq!(index.len(), 3);

    let extracted = extract_all(&depot, &index, depot.blob.as_slice());
    let expected: Vec<(String, Vec<u8>)> = depot
        .expected
        .iter()
        .map(|(path, data)| ((*path).to_string(), data.clone()))
        .collect();
    assert_eq!(extracted, expected);
}

#[test]
fn depot_layouts_agree() {
    let depot = depot();
    let bounded = IndexParser::new().parse(depot.index.as_slice()).unwrap();
    let counted = IndexParser::new()
        .with_layout(IndexLayout::Counted)
        .parse(depot.index.as_slice())
        .unwrap();
    assert_eq!(bounded, counted);
}

#[test]
fn depot_shared_blob_across_threads() {
    let depot = Arc::new(depot());
    let index = Arc::new(DepotIndex::parse(&depot.index).unwrap());
    let blob = Arc::new(depot.blob.clone());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let depot = Arc::clone(&depot);
            let index = Arc::clone(&index);
            let blob = Arc::clone(&blob);
            std::thread::spawn(move || extract_all(&depot, &index, &blob))
        })
        .collect();

    for handle in handles {
        let extracted = handle.join().unwrap();
        assert_eq!(extracted.len(), 3);
        assert_eq!(extracted[1].1, depot.expected[1].1);
    }
}

#[test]
fn depot_reads_from_file() {
    let depot = depot();
    let mut blob_file = tempfile::tempfile().unwrap();
    blob_file.write_all(&depot.blob).unwrap();

    let index = DepotIndex::parse(&depot.index).unwrap();
    let extracted = extract_all(&depot, &index, &blob_file);
    assert_eq!(extracted[0].1, depot.expected[0].1);
}

#[test]
fn depot_without_key_fails_encrypted_file_only() {
    let depot = depot();
    let index = DepotIndex::parse(&depot.index).unwrap();
    let no_keys = DepotKeyStore::new();

    let plain = index.get(10).unwrap();
    assert!(plain.prepare_with_keys(&no_keys, DEPOT_ID, depot.blob.as_slice()).is_ok());

    let secret = index.get(11).unwrap();
    let result = secret.prepare_with_keys(&no_keys, DEPOT_ID, depot.blob.as_slice());
    assert!(matches!(result, Err(SegmentError::MissingKey)));
}

#[test]
fn depot_truncated_blob_fails_prepare() {
    let depot = depot();
    let index = DepotIndex::parse(&depot.index).unwrap();
    let short = &depot.blob[..depot.blob.len() / 2];

    let result = index
        .get(11)
        .unwrap()
        .prepare_with_keys(&depot.keys, DEPOT_ID, short);
    assert!(matches!(result, Err(SegmentError::ReadData { .. })));
}
