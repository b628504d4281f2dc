//! Writing manifest items onto disk.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use depot_crypto::DepotKeyProvider;
use depot_formats::BlobSource;
use depot_formats::index::DepotIndex;
use depot_formats::manifest::{Manifest, ManifestItem};
use depot_formats::segment::SegmentError;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};

/// Outcome of an extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Directories created
    pub directories: usize,
    /// Files written
    pub files: usize,
    /// Decoded bytes written
    pub bytes: u64,
    /// Manifest paths skipped because of an error
    pub failed: Vec<String>,
}

/// Extracts every manifest item below one output directory.
#[derive(Debug)]
pub struct Extractor<'a, P: ?Sized, S: ?Sized> {
    manifest: &'a Manifest,
    index: &'a DepotIndex,
    keys: &'a P,
    source: &'a S,
    keep_going: bool,
}

impl<'a, P, S> Extractor<'a, P, S>
where
    P: DepotKeyProvider + ?Sized,
    S: BlobSource + ?Sized,
{
    /// Create an extractor that stops at the first failing item.
    pub fn new(manifest: &'a Manifest, index: &'a DepotIndex, keys: &'a P, source: &'a S) -> Self {
        Self {
            manifest,
            index,
            keys,
            source,
            keep_going: false,
        }
    }

    /// Log failing items and carry on instead of stopping.
    #[must_use]
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Create directories and write files below `output`.
    pub fn run(&self, output: &Path) -> ExtractResult<ExtractSummary> {
        let mut summary = ExtractSummary::default();
        fs::create_dir_all(output).map_err(|source| ExtractError::Io {
            path: output.to_path_buf(),
            source,
        })?;

        for item in &self.manifest.items {
            match self.extract_item(item, output) {
                Ok(None) => summary.directories += 1,
                Ok(Some(written)) => {
                    summary.files += 1;
                    summary.bytes += written;
                }
                Err(e) if self.keep_going => {
                    warn!("Skipping {}: {}", item.path, e);
                    summary.failed.push(item.path.clone());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }

    /// Returns the decoded size for files and `None` for directories.
    fn extract_item(&self, item: &ManifestItem, output: &Path) -> ExtractResult<Option<u64>> {
        let target = output.join(relative_path(&item.path)?);

        if item.is_directory() {
            fs::create_dir_all(&target).map_err(|source| ExtractError::Io {
                path: target.clone(),
                source,
            })?;
            return Ok(None);
        }

        let file = self
            .index
            .get(u64::from(item.id))
            .ok_or_else(|| ExtractError::MissingIndexRecord {
                path: item.path.clone(),
                id: item.id,
            })?;

        let decode_error = |source| ExtractError::Decode {
            path: item.path.clone(),
            source,
        };
        let io_error = |source| ExtractError::Io {
            path: target.clone(),
            source,
        };

        let mut reader = file
            .prepare_with_keys(self.keys, self.manifest.depot_id(), self.source)
            .map_err(decode_error)?;

        // Staged next to the target; dropped (and deleted) unless fully decoded
        let parent = target.parent().unwrap_or(output);
        fs::create_dir_all(parent).map_err(io_error)?;
        let mut staged = NamedTempFile::new_in(parent).map_err(io_error)?;

        let mut out = BufWriter::new(staged.as_file_mut());
        let written = io::copy(&mut reader, &mut out).map_err(|e| match into_segment_error(e) {
            Ok(segment) => decode_error(segment),
            Err(e) => io_error(e),
        })?;
        out.flush().map_err(io_error)?;
        drop(out);
        reader.close().map_err(decode_error)?;

        staged.persist(&target).map_err(|e| io_error(e.error))?;

        if written != u64::from(item.size) {
            warn!(
                "{} decoded to {} bytes, manifest says {}",
                item.path, written, item.size
            );
        }
        debug!(path = %item.path, id = item.id, written, "Extracted file");
        Ok(Some(written))
    }
}

/// Recover the decoder error carried by a failed read, if there is one
fn into_segment_error(e: io::Error) -> Result<SegmentError, io::Error> {
    let kind = e.kind();
    if SegmentError::from_io(&e).is_none() {
        return Err(e);
    }
    match e.into_inner().map(|inner| inner.downcast::<SegmentError>()) {
        Some(Ok(segment)) => Ok(*segment),
        Some(Err(other)) => Err(io::Error::new(kind, other)),
        None => Err(io::Error::from(kind)),
    }
}

/// Turn a manifest path into a path that stays below the output directory
///
/// Empty and `.` components are dropped; anything else that is not a plain
/// name is rejected.
pub fn relative_path(path: &str) -> ExtractResult<PathBuf> {
    let mut relative = PathBuf::new();
    for part in path.split('/').filter(|part| !part.is_empty()) {
        for component in Path::new(part).components() {
            match component {
                Component::Normal(name) => relative.push(name),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ExtractError::UnsafePath(path.to_string()));
                }
            }
        }
    }
    Ok(relative)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("").unwrap(), PathBuf::new());
        assert_eq!(
            relative_path("maps/level01.bin").unwrap(),
            Path::new("maps").join("level01.bin")
        );
        assert_eq!(
            relative_path("/./docs//a.txt").unwrap(),
            Path::new("docs").join("a.txt")
        );
    }

    #[test]
    fn test_into_segment_error() {
        let e = into_segment_error(io::Error::other(SegmentError::MissingKey)).unwrap();
        assert!(matches!(e, SegmentError::MissingKey));

        let plain = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let e = into_segment_error(plain).unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_relative_path_rejects_parent() {
        assert!(matches!(
            relative_path("maps/../../etc/passwd"),
            Err(ExtractError::UnsafePath(_))
        ));
        assert!(matches!(relative_path(".."), Err(ExtractError::UnsafePath(_))));
    }
}
