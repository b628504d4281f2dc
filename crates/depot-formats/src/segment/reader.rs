//! Prepared segment streams

use std::fmt;
use std::io::{self, BufRead, BufReader, Cursor, Read};

use depot_crypto::AesCfbReader;
use flate2::bufread::ZlibDecoder;

use super::error::{SegmentError, SegmentResult};
use super::mode::Mode;

/// Decoder chain over one segment's encoded bytes
///
/// The outermost stage is whichever of decrypt/decompress is applied last.
enum DecodedStream {
    Raw(Cursor<Vec<u8>>),
    Decrypting(AesCfbReader<Cursor<Vec<u8>>>),
    Decompressing(Box<ZlibDecoder<BufReader<Box<dyn Read + Send>>>>),
}

impl DecodedStream {
    /// Build the decoder chain for `mode` over `payload`
    ///
    /// `payload` must already be positioned past any size hints.
    fn open(payload: Cursor<Vec<u8>>, key: Option<&[u8]>, mode: Mode) -> SegmentResult<Self> {
        match mode {
            Mode::Raw => Ok(Self::Raw(payload)),
            Mode::Encrypted => Ok(Self::Decrypting(decryptor(payload, key)?)),
            Mode::Compressed => Self::inflate(Box::new(payload)),
            Mode::EncryptedCompressed => Self::inflate(Box::new(decryptor(payload, key)?)),
        }
    }

    fn inflate(inner: Box<dyn Read + Send>) -> SegmentResult<Self> {
        let mut buffered = BufReader::new(inner);
        let header = buffered
            .fill_buf()
            .map_err(|e| SegmentError::DecompressionInit(e.to_string()))?;
        check_zlib_header(header)?;
        Ok(Self::Decompressing(Box::new(ZlibDecoder::new(buffered))))
    }

    fn stage(&self) -> &'static str {
        match self {
            Self::Raw(_) => "raw",
            Self::Decrypting(_) => "decrypting",
            Self::Decompressing(_) => "decompressing",
        }
    }
}

impl Read for DecodedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Raw(r) => r.read(buf),
            Self::Decrypting(r) => r.read(buf),
            Self::Decompressing(r) => r
                .read(buf)
                .map_err(|e| SegmentError::Decompression(e).into_io()),
        }
    }
}

fn decryptor(
    payload: Cursor<Vec<u8>>,
    key: Option<&[u8]>,
) -> SegmentResult<AesCfbReader<Cursor<Vec<u8>>>> {
    let key = key.ok_or(SegmentError::MissingKey)?;
    AesCfbReader::new(payload, key).map_err(SegmentError::CipherInit)
}

/// Validate the two-byte zlib stream header (RFC 1950)
fn check_zlib_header(header: &[u8]) -> SegmentResult<()> {
    let [cmf, flg, ..] = *header else {
        return Err(SegmentError::DecompressionInit(format!(
            "stream too short for zlib header ({} bytes)",
            header.len()
        )));
    };

    if cmf & 0x0F != 8 || cmf >> 4 > 7 {
        return Err(SegmentError::DecompressionInit(format!(
            "unsupported compression method 0x{cmf:02X}"
        )));
    }
    if ((u16::from(cmf) << 8) | u16::from(flg)) % 31 != 0 {
        return Err(SegmentError::DecompressionInit(
            "zlib header checksum mismatch".to_string(),
        ));
    }
    if flg & 0x20 != 0 {
        return Err(SegmentError::DecompressionInit(
            "preset dictionary not supported".to_string(),
        ));
    }
    Ok(())
}

enum ReaderState {
    Empty,
    Open(DecodedStream),
    Closed,
}

/// Read-once decoded stream for one prepared segment
///
/// Reads after [`close`](Self::close) fail with [`SegmentError::NotPrepared`].
pub struct SegmentReader {
    state: ReaderState,
}

impl SegmentReader {
    /// Reader for a zero-length segment; reads as immediate end of input
    pub(crate) fn empty() -> Self {
        Self {
            state: ReaderState::Empty,
        }
    }

    pub(crate) fn open(
        payload: Cursor<Vec<u8>>,
        key: Option<&[u8]>,
        mode: Mode,
    ) -> SegmentResult<Self> {
        Ok(Self {
            state: ReaderState::Open(DecodedStream::open(payload, key, mode)?),
        })
    }

    /// Whether a zlib decompressor is attached
    pub fn has_decompressor(&self) -> bool {
        matches!(self.state, ReaderState::Open(DecodedStream::Decompressing(_)))
    }

    /// Whether the reader has been closed
    pub fn is_closed(&self) -> bool {
        matches!(self.state, ReaderState::Closed)
    }

    /// Release the decoder chain and its buffers
    ///
    /// Closing twice, or closing a reader with no decompressor, is a no-op.
    pub fn close(&mut self) -> SegmentResult<()> {
        self.state = ReaderState::Closed;
        Ok(())
    }
}

impl Read for SegmentReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.state {
            ReaderState::Empty => Ok(0),
            ReaderState::Open(stream) => stream.read(buf),
            ReaderState::Closed => Err(SegmentError::NotPrepared.into_io()),
        }
    }
}

impl fmt::Debug for SegmentReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            ReaderState::Empty => "empty",
            ReaderState::Open(stream) => stream.stage(),
            ReaderState::Closed => "closed",
        };
        f.debug_struct("SegmentReader").field("state", &state).finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zlib_header_validation() {
        // Default zlib header
        assert!(check_zlib_header(&[0x78, 0x9C]).is_ok());
        // Best compression
        assert!(check_zlib_header(&[0x78, 0xDA, 0x00]).is_ok());

        let bad_headers: [&[u8]; 5] = [&[], &[0x78], &[0x79, 0x9C], &[0x78, 0x9D], &[0x78, 0xBB]];
        for bad in bad_headers {
            assert!(
                matches!(
                    check_zlib_header(bad),
                    Err(SegmentError::DecompressionInit(_))
                ),
                "header {bad:02X?} should be rejected"
            );
        }
    }

    #[test]
    fn test_closed_reader_is_not_prepared() {
        let mut reader =
            SegmentReader::open(Cursor::new(b"abc".to_vec()), None, Mode::Raw).unwrap();
        assert!(!reader.has_decompressor());
        reader.close().unwrap();
        reader.close().unwrap();
        assert!(reader.is_closed());

        let err = reader.read(&mut [0u8; 4]).unwrap_err();
        assert!(matches!(
            SegmentError::from_io(&err),
            Some(SegmentError::NotPrepared)
        ));
    }

    #[test]
    fn test_debug_shows_stage() {
        let reader = SegmentReader::empty();
        assert_eq!(format!("{reader:?}"), "SegmentReader { state: \"empty\" }");
    }
}
