//! Index record stream parser

use std::io::{self, Cursor, Read};

use binrw::BinRead;
use tracing::{debug, trace};

use super::DepotIndex;
use super::error::{IndexError, IndexResult};
use crate::segment::{LogicalFile, Mode, Segment};

/// Size of a record header: id, table length, mode
pub const RECORD_HEADER_SIZE: usize = 24;

/// Size of one `(offset, length)` segment pair
pub const SEGMENT_PAIR_SIZE: u64 = 16;

/// How a record's segment table is framed
///
/// Both layouts produce the same [`DepotIndex`] for well-formed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexLayout {
    /// Read pairs from a sub-stream bounded to the table length until it is
    /// exhausted; a partial trailing pair is an error
    #[default]
    Bounded,
    /// Read `ceil(length / 16)` pairs straight from the record stream
    Counted,
}

/// Record header, big-endian
#[derive(Debug, Clone, Copy, BinRead)]
#[br(big)]
struct RecordHeader {
    id: u64,
    length: u64,
    mode: u64,
}

/// Parser for the binary index
#[derive(Debug, Clone, Default)]
pub struct IndexParser {
    layout: IndexLayout,
}

impl IndexParser {
    /// Create a parser for the default (bounded) layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the segment table layout
    pub fn with_layout(mut self, layout: IndexLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Configured layout
    pub fn layout(&self) -> IndexLayout {
        self.layout
    }

    /// Parse records until the input ends on a record boundary
    ///
    /// Repeated ids keep the last record.
    pub fn parse<R: Read>(&self, mut reader: R) -> IndexResult<DepotIndex> {
        let mut index = DepotIndex::default();
        let mut records = 0usize;

        while let Some(header) = read_record_header(&mut reader)? {
            let mode = Mode::from_value(header.mode).ok_or(IndexError::UnknownMode {
                id: header.id,
                mode: header.mode,
            })?;

            let segments = match self.layout {
                IndexLayout::Bounded => read_bounded_table(&mut reader, &header)?,
                IndexLayout::Counted => read_counted_table(&mut reader, &header)?,
            };

            trace!(
                id = header.id,
                segments = segments.len(),
                ?mode,
                "Read index record"
            );

            if index
                .insert(header.id, LogicalFile::new(segments, mode))
                .is_some()
            {
                debug!(id = header.id, "Duplicate file id, keeping last record");
            }
            records += 1;
        }

        debug!("Parsed {} index records into {} files", records, index.len());
        Ok(index)
    }
}

/// Read the next record header
///
/// Returns `None` when the input ends before any header byte; ending
/// partway through a header is an error.
fn read_record_header<R: Read>(reader: &mut R) -> IndexResult<Option<RecordHeader>> {
    let mut buf = [0u8; RECORD_HEADER_SIZE];
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(IndexError::Io(e)),
        }
    }

    match filled {
        0 => Ok(None),
        RECORD_HEADER_SIZE => Ok(Some(RecordHeader::read(&mut Cursor::new(&buf))?)),
        read => Err(IndexError::TruncatedHeader { read }),
    }
}

fn read_bounded_table<R: Read>(reader: &mut R, header: &RecordHeader) -> IndexResult<Vec<Segment>> {
    let mut table = Vec::new();
    reader.by_ref().take(header.length).read_to_end(&mut table)?;

    let end = table.len() as u64;
    if end < header.length {
        return Err(IndexError::TruncatedSegmentTable {
            id: header.id,
            reason: format!("expected {} bytes, found {end}", header.length),
        });
    }

    let mut segments = Vec::with_capacity(table.len() / SEGMENT_PAIR_SIZE as usize);
    let mut cursor = Cursor::new(table);
    while cursor.position() < end {
        let remaining = end - cursor.position();
        if remaining < SEGMENT_PAIR_SIZE {
            return Err(IndexError::TruncatedSegmentTable {
                id: header.id,
                reason: format!("{remaining} trailing bytes after last segment pair"),
            });
        }
        segments.push(Segment::read(&mut cursor)?);
    }
    Ok(segments)
}

fn read_counted_table<R: Read>(reader: &mut R, header: &RecordHeader) -> IndexResult<Vec<Segment>> {
    let count = header.length.div_ceil(SEGMENT_PAIR_SIZE);
    let mut segments = Vec::with_capacity(count.min(1024) as usize);

    for i in 0..count {
        let mut pair = [0u8; SEGMENT_PAIR_SIZE as usize];
        reader.read_exact(&mut pair).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                IndexError::TruncatedSegmentTable {
                    id: header.id,
                    reason: format!("input ended at segment {i} of {count}"),
                }
            } else {
                IndexError::Io(e)
            }
        })?;
        segments.push(Segment::read(&mut Cursor::new(&pair))?);
    }
    Ok(segments)
}
