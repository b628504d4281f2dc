//! Manifest parser and path resolution

use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use binrw::BinRead;
use tracing::{debug, trace};

use super::error::{ManifestError, ManifestResult};
use super::header::ManifestHeader;
use super::item::ManifestItem;
use super::{HEADER_SIZE, ITEM_SIZE, Manifest, NAME_PROBE_LEN};

type Sanitizer = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Parser for the binary manifest
///
/// Names are kept as stored unless a sanitizer is installed with
/// [`with_sanitizer`](Self::with_sanitizer). Whether to install one is up to
/// the caller.
#[derive(Default)]
pub struct ManifestParser {
    sanitizer: Option<Sanitizer>,
}

impl fmt::Debug for ManifestParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestParser")
            .field("sanitizer", &self.sanitizer.is_some())
            .finish()
    }
}

impl ManifestParser {
    /// Create a parser that keeps names as stored
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite every item name with `sanitizer` before paths are built
    pub fn with_sanitizer<F>(mut self, sanitizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.sanitizer = Some(Box::new(sanitizer));
        self
    }

    /// Parse a complete manifest
    ///
    /// Items are read first; paths are resolved in a second pass once the
    /// whole table is loaded, since parents may appear after their children.
    pub fn parse<R: Read + Seek>(&self, mut reader: R) -> ManifestResult<Manifest> {
        let stream_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = ManifestHeader::read(&mut reader)?;
        let names_start = HEADER_SIZE + u64::from(header.num_items) * ITEM_SIZE;
        if names_start > stream_len {
            return Err(ManifestError::ItemTableOutOfBounds {
                num_items: header.num_items,
                stream_len,
            });
        }

        let mut items = Vec::with_capacity(header.num_items as usize);
        for index in 0..header.num_items as usize {
            reader.seek(SeekFrom::Start(HEADER_SIZE + index as u64 * ITEM_SIZE))?;
            let mut item = ManifestItem::read(&mut reader)?;

            reader.seek(SeekFrom::Start(names_start + u64::from(item.name_offset)))?;
            let name = read_name(&mut reader, index)?;
            item.name = match &self.sanitizer {
                Some(sanitize) => sanitize(&name),
                None => name,
            };

            trace!(index, name = %item.name, parent = item.parent_index, "Read manifest item");
            items.push(item);
        }

        resolve_paths(&mut items)?;

        debug!(
            depot_id = header.depot_id,
            "Parsed manifest with {} items",
            items.len()
        );
        Ok(Manifest { header, items })
    }
}

/// Read a NUL-terminated name through a fixed-size probe
fn read_name<R: Read>(reader: &mut R, index: usize) -> ManifestResult<String> {
    let mut probe = Vec::with_capacity(NAME_PROBE_LEN);
    reader
        .by_ref()
        .take(NAME_PROBE_LEN as u64)
        .read_to_end(&mut probe)?;

    let end = probe
        .iter()
        .position(|&b| b == 0)
        .ok_or(ManifestError::MalformedName { index })?;
    Ok(String::from_utf8_lossy(&probe[..end]).into_owned())
}

/// Fill `path` on every item by walking parent links
///
/// A chain longer than the table can only come from a cycle.
fn resolve_paths(items: &mut [ManifestItem]) -> ManifestResult<()> {
    let mut paths = Vec::with_capacity(items.len());

    for index in 0..items.len() {
        let mut hierarchy: Vec<&str> = Vec::new();
        let mut position = index;
        let mut current = &items[index];
        loop {
            hierarchy.push(&current.name);
            let Some(parent) = current.parent() else {
                break;
            };
            let Some(next) = items.get(parent) else {
                return Err(ManifestError::ParentOutOfRange {
                    index: position,
                    parent: current.parent_index,
                });
            };
            if hierarchy.len() >= items.len() {
                return Err(ManifestError::ParentCycle { index });
            }
            position = parent;
            current = next;
        }

        hierarchy.reverse();
        paths.push(join_path(&hierarchy));
    }

    for (item, path) in items.iter_mut().zip(paths) {
        item.path = path;
    }
    Ok(())
}

/// Join names with `/`, skipping empty components
fn join_path(names: &[&str]) -> String {
    names
        .iter()
        .filter(|name| !name.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}
