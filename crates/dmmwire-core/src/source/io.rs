use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

use super::{ByteSource, SourceError};

/// Byte source backed by any `std::io::Read`: a configured serial device
/// node, a capture file, or stdin.
///
/// Reads are buffered; a read of zero bytes is treated as end of stream and
/// interrupted reads are retried.
pub struct ReaderSource<R> {
    inner: BufReader<R>,
}

impl ReaderSource<File> {
    /// Open a device node or capture file for reading.
    ///
    /// The line settings (2400 baud, 8N1) must already be applied to a
    /// device; this only opens it.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        read_one(&mut self.inner).map_err(SourceError::from)
    }
}

fn read_one<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, ErrorKind, Read};

    use super::ReaderSource;
    use crate::source::{ByteSource, SourceError};

    struct Flaky {
        interrupted: bool,
    }

    impl Read for Flaky {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            Err(io::Error::new(ErrorKind::BrokenPipe, "unplugged"))
        }
    }

    #[test]
    fn reader_source_reads_cursor() {
        let mut source = ReaderSource::new(Cursor::new(vec![0x27, 0xE8]));
        assert_eq!(source.next_byte().unwrap(), Some(0x27));
        assert_eq!(source.next_byte().unwrap(), Some(0xE8));
        assert_eq!(source.next_byte().unwrap(), None);
    }

    #[test]
    fn interrupted_reads_are_retried_and_errors_surface() {
        let mut source = ReaderSource::new(Flaky { interrupted: false });
        let err = source.next_byte().unwrap_err();
        match err {
            SourceError::Io(err) => assert_eq!(err.kind(), ErrorKind::BrokenPipe),
        }
    }
}
