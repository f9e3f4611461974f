//! Positioned reads over seekable streams

use crate::{traits::ReadSeek, Error, Result};
use std::io::{ErrorKind, SeekFrom};

/// Read exactly `buf.len()` bytes starting at absolute `offset`
///
/// Running out of input is reported through `on_eof` so callers can decide
/// whether a short stream means truncation or a bad header. Other I/O
/// failures pass through as [`Error::Io`].
pub fn read_exact_at(
    stream: &mut dyn ReadSeek,
    offset: u64,
    buf: &mut [u8],
    on_eof: impl FnOnce() -> Error,
) -> Result<()> {
    stream.seek(SeekFrom::Start(offset))?;
    match stream.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(on_eof()),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Total stream length in bytes
pub fn stream_length(stream: &mut dyn ReadSeek) -> Result<u64> {
    Ok(stream.seek(SeekFrom::End(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_exact_at() {
        let data: Vec<u8> = (0..=255).collect();
        let mut cursor = Cursor::new(data);

        let mut buf = [0u8; 4];
        read_exact_at(&mut cursor, 16, &mut buf, || Error::truncated("x")).unwrap();
        assert_eq!(buf, [16, 17, 18, 19]);
    }

    #[test]
    fn test_read_past_end_uses_eof_error() {
        let mut cursor = Cursor::new(vec![0u8; 100]);
        let mut buf = [0u8; 8];

        let err = read_exact_at(&mut cursor, 96, &mut buf, || Error::truncated("short")).unwrap_err();
        assert!(matches!(err, Error::TruncatedInput(_)));

        let err = read_exact_at(&mut cursor, 4096, &mut buf, || Error::malformed_header("far"))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn test_stream_length() {
        let mut cursor = Cursor::new(vec![0u8; 1536]);
        assert_eq!(stream_length(&mut cursor).unwrap(), 1536);
    }
}
