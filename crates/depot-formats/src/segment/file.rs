//! Logical files: ordered segment concatenation

use std::io::{self, Read};

use depot_crypto::DepotKeyProvider;
use serde::Serialize;
use tracing::debug;

use super::error::{SegmentError, SegmentResult};
use super::mode::Mode;
use super::reader::SegmentReader;
use super::Segment;
use crate::BlobSource;

/// One decoded file: its segments in index order plus their shared mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalFile {
    /// Segments, concatenated in this order
    #[serde(rename = "blocks")]
    pub segments: Vec<Segment>,
    /// Encoding mode shared by every segment
    pub mode: Mode,
}

impl LogicalFile {
    /// Create a new logical file descriptor
    pub fn new(segments: Vec<Segment>, mode: Mode) -> Self {
        Self { segments, mode }
    }

    /// Total encoded size across all segments
    pub fn encoded_size(&self) -> u64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// Prepare every segment in order
    ///
    /// The first segment that fails aborts the whole file and its error is
    /// returned; readers prepared so far are dropped.
    pub fn prepare<S: BlobSource + ?Sized>(
        &self,
        key: Option<&[u8]>,
        source: &S,
    ) -> SegmentResult<FileReader> {
        let mut readers = Vec::with_capacity(self.segments.len());
        for (index, segment) in self.segments.iter().enumerate() {
            let reader = segment.prepare(key, source, self.mode).inspect_err(|e| {
                debug!(
                    index,
                    offset = segment.offset,
                    length = segment.length,
                    "Segment preparation failed: {e}"
                );
            })?;
            readers.push(reader);
        }
        Ok(FileReader::new(readers))
    }

    /// Prepare with the key registered for `depot_id`
    ///
    /// A missing key only matters when the mode is encrypted, where it
    /// surfaces as [`SegmentError::MissingKey`].
    pub fn prepare_with_keys<P, S>(
        &self,
        keys: &P,
        depot_id: u32,
        source: &S,
    ) -> SegmentResult<FileReader>
    where
        P: DepotKeyProvider + ?Sized,
        S: BlobSource + ?Sized,
    {
        self.prepare(keys.lookup(depot_id), source)
    }
}

/// Read-once stream over a prepared file
///
/// Segment `i` is read to exhaustion before segment `i + 1` begins. After
/// [`close`](Self::close) the segment buffers are released and reads fail
/// with [`SegmentError::NotPrepared`].
#[derive(Debug)]
pub struct FileReader {
    segments: Option<Vec<SegmentReader>>,
    current: usize,
}

impl FileReader {
    fn new(segments: Vec<SegmentReader>) -> Self {
        Self {
            segments: Some(segments),
            current: 0,
        }
    }

    /// Number of prepared segments, or zero once closed
    pub fn segment_count(&self) -> usize {
        self.segments.as_ref().map_or(0, Vec::len)
    }

    /// Whether the reader has been closed
    pub fn is_closed(&self) -> bool {
        self.segments.is_none()
    }

    /// Close every segment in order and drop them
    ///
    /// The first failing segment's error is returned without closing the
    /// rest, but every segment is released either way. Closing again is a
    /// no-op.
    pub fn close(&mut self) -> SegmentResult<()> {
        let Some(segments) = self.segments.take() else {
            return Ok(());
        };
        for mut segment in segments {
            segment.close()?;
        }
        Ok(())
    }
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(segments) = self.segments.as_mut() else {
            return Err(SegmentError::NotPrepared.into_io());
        };
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(segment) = segments.get_mut(self.current) {
            let n = segment.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            self.current += 1;
        }
        Ok(0)
    }
}
