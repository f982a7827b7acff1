use thiserror::Error;

use crate::source::SourceError;

/// Errors returned while assembling a frame from the byte source.
///
/// `PowerOn` is an operational signal rather than a fault; `EndOfStream` and
/// `Source` are fatal for the read loop. Every other variant voids only the
/// current frame.
///
/// # Examples
/// ```
/// use dmmwire_core::FrameError;
///
/// let err = FrameError::InvalidFraming { byte: 0xF3 };
/// assert!(err.to_string().contains("0xF3"));
/// assert!(!err.is_fatal());
/// ```
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("meter powered on")]
    PowerOn,
    #[error("invalid framing byte 0x{byte:02X}")]
    InvalidFraming { byte: u8 },
    #[error("short frame: only {accepted} bytes accepted before the terminal byte")]
    ShortFrame { accepted: usize },
    #[error("frame too long: no terminal byte within {attempts} bytes")]
    FrameTooLong { attempts: usize },
    #[error("byte source ended")]
    EndOfStream,
    #[error("byte source failed: {0}")]
    Source(#[from] SourceError),
}

impl FrameError {
    /// True when the byte source itself is exhausted or unreadable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FrameError::EndOfStream | FrameError::Source(_))
    }
}

/// Errors returned while turning a slot buffer into a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown digit: segment code 0x{code:02X} is not in the digit table")]
    UnknownDigit { code: u8 },
}

/// Either stage failing while decoding a single frame end to end.
#[derive(Debug, Error)]
pub enum DecodeFrameError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl DecodeFrameError {
    pub fn is_fatal(&self) -> bool {
        match self {
            DecodeFrameError::Frame(err) => err.is_fatal(),
            DecodeFrameError::Decode(_) => false,
        }
    }
}
