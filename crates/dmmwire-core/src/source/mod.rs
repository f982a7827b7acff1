//! Byte sources feeding the frame assembler.
//!
//! The assembler only needs "next byte, end, or failure"; device and file
//! handling stay here so the protocol layer can be driven from memory in
//! tests.

mod io;

pub use io::ReaderSource;

use thiserror::Error;

/// Yields one byte at a time from the meter's stream.
///
/// `Ok(None)` means the stream has ended and no further bytes will arrive.
pub trait ByteSource {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        (**self).next_byte()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// In-memory byte source over a borrowed slice.
///
/// # Examples
/// ```
/// use dmmwire_core::{ByteSource, SliceSource};
///
/// let mut source = SliceSource::new(&[0x27, 0x3D]);
/// assert_eq!(source.next_byte()?, Some(0x27));
/// assert_eq!(source.remaining(), 1);
/// # Ok::<(), dmmwire_core::SourceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let byte = self.bytes.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }
}

/// Yields the given bytes, then fails with a broken-pipe error on every call.
#[cfg(test)]
pub(crate) struct FailingSource<'a> {
    bytes: SliceSource<'a>,
}

#[cfg(test)]
impl<'a> FailingSource<'a> {
    pub(crate) fn after(bytes: &'a [u8]) -> Self {
        Self {
            bytes: SliceSource::new(bytes),
        }
    }
}

#[cfg(test)]
impl ByteSource for FailingSource<'_> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        match self.bytes.next_byte()? {
            Some(byte) => Ok(Some(byte)),
            None => Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            ))),
        }
    }
}
