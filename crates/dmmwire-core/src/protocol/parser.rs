use log::trace;

use super::attributes::decode_attributes;
use super::digits::{Digit, DigitReading, decode_digit};
use super::error::{DecodeError, DecodeFrameError, FrameError};
use super::layout;
use super::reader::{FramingIndex, SlotBuffer, payload_nibble};
use crate::reading::Reading;
use crate::source::{ByteSource, SliceSource};

/// Pull bytes from `source` until one frame is complete.
///
/// Each byte names its own slot in the high nibble, so the frame is checked
/// structurally: a `0xE_` byte ends it, and at least 13 bytes (wire slot 1
/// may be missing) must have been accepted by then. At most 15 bytes are
/// pulled per call.
///
/// # Errors
/// - `PowerOn` on a zero byte; bytes accepted so far are dropped.
/// - `InvalidFraming` on a byte whose high nibble is `0x0` or `0xF`.
/// - `ShortFrame` when the terminal byte arrives too early.
/// - `FrameTooLong` when no terminal byte arrives within 15 bytes.
/// - `EndOfStream` / `Source` when the source ends or fails.
pub fn read_frame<S: ByteSource + ?Sized>(source: &mut S) -> Result<SlotBuffer, FrameError> {
    let mut slots = SlotBuffer::new();
    let mut accepted = 0usize;

    for _ in 0..layout::MAX_FRAME_ATTEMPTS {
        let byte = source.next_byte()?.ok_or(FrameError::EndOfStream)?;
        if byte == layout::POWER_ON_BYTE {
            return Err(FrameError::PowerOn);
        }

        let index = FramingIndex::from_byte(byte).ok_or(FrameError::InvalidFraming { byte })?;
        slots.store(index, payload_nibble(byte));
        accepted += 1;
        trace!("accepted byte 0x{byte:02X} into slot {}", index.get());

        if index.is_terminal() {
            if accepted < layout::MIN_FRAME_BYTES {
                return Err(FrameError::ShortFrame { accepted });
            }
            return Ok(slots);
        }
    }

    Err(FrameError::FrameTooLong {
        attempts: layout::MAX_FRAME_ATTEMPTS,
    })
}

/// Decode the four digits and the attribute set of a complete frame.
///
/// # Errors
/// Returns the first `DecodeError` among the digits; a reading is never
/// produced with an unknown digit.
pub fn decode_reading(slots: &SlotBuffer) -> Result<Reading, DecodeError> {
    let mut digits = [DigitReading {
        digit: Digit::Blank,
        point: false,
    }; layout::DIGIT_COUNT];
    for (position, digit) in digits.iter_mut().enumerate() {
        let (high, low) = slots.digit_pair(position).unwrap_or((0, 0));
        *digit = decode_digit(high, low)?;
    }
    Ok(Reading::new(digits, decode_attributes(slots)))
}

/// Decode exactly one frame from an in-memory byte sequence.
///
/// Bytes after the terminal byte are ignored.
///
/// # Examples
/// ```
/// use dmmwire_core::decode_frame_bytes;
///
/// let bytes = [
///     0x27, 0x3D, 0x42, 0x57, 0x69, 0x75, 0x80, 0x95, 0xA2, 0xB0, 0xC4, 0xD0, 0xE8,
/// ];
/// let reading = decode_frame_bytes(&bytes)?;
/// assert_eq!(reading.display(), "04.71");
/// # Ok::<(), dmmwire_core::DecodeFrameError>(())
/// ```
pub fn decode_frame_bytes(bytes: &[u8]) -> Result<Reading, DecodeFrameError> {
    let mut source = SliceSource::new(bytes);
    let slots = read_frame(&mut source)?;
    Ok(decode_reading(&slots)?)
}
