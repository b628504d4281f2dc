//! Index, manifest and segment decoders for depot archives
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::doc_markdown)] // Format-specific terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
//! A depot is made of three inputs:
//!
//! - an **index** mapping numeric file ids to ordered segment lists inside a
//!   data blob, together with the encoding mode of each file
//! - a **manifest** describing the directory tree: item names, sizes, ids
//!   and parent links
//! - the **data blob** itself, read at arbitrary offsets
//!
//! # Supported Formats
//!
//! - **Index**: big-endian record stream, both historical layouts
//! - **Manifest**: little-endian header, fixed-size item table, name block
//! - **Segments**: raw, zlib, AES-CFB, and AES-CFB wrapped zlib payloads
//!
//! # Decoding Pipeline
//!
//! Parsing yields plain descriptors ([`segment::LogicalFile`],
//! [`segment::Segment`]). Calling `prepare` on a descriptor reads the encoded
//! bytes from a [`BlobSource`] and returns a reader that decrypts before it
//! decompresses. A prepared file is read once and then closed.
//!
//! ```
//! use depot_formats::index::DepotIndex;
//! use depot_formats::segment::Mode;
//! use std::io::Read;
//!
//! // One raw file with a single four-byte segment at offset 0
//! let mut index = Vec::new();
//! for field in [1u64, 16, 0, 0, 4] {
//!     index.extend_from_slice(&field.to_be_bytes());
//! }
//! let index = DepotIndex::parse(&index).expect("valid index");
//!
//! let blob = b"data".to_vec();
//! let file = index.get(1).expect("file 1");
//! assert_eq!(file.mode, Mode::Raw);
//!
//! let mut reader = file.prepare(None, &blob).expect("prepare");
//! let mut content = Vec::new();
//! reader.read_to_end(&mut content).expect("read");
//! reader.close().expect("close");
//! assert_eq!(content, b"data");
//! ```

#![warn(missing_docs)]

/// Binary index format mapping file ids to segment layouts
///
/// The index is a flat stream of records. Each record names a file id, the
/// byte length of its segment table and the encoding mode shared by all of
/// its segments. Both historical layouts normalize to [`index::DepotIndex`].
pub mod index;
/// Binary manifest format describing the depot directory tree
///
/// Items are read into a flat array first; paths are resolved afterwards
/// by walking parent links over the complete array.
pub mod manifest;
pub mod segment;
mod source;

pub use source::BlobSource;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;
