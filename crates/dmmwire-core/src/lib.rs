//! dmmwire core library: decoding of a handheld multimeter's serial data dump.
//!
//! In RS232 mode the meter (TP4000ZC class) sends one 13 or 14 byte frame per
//! sample, unprompted. Each byte carries its 1-based slot number in the high
//! nibble and payload in the low nibble. Slots 2-9 hold LCD segment patterns
//! for four digits; slots 1 and 10-14 hold 24 mode/unit flags. A single zero
//! byte is sent when the meter is switched on.
//!
//! Pipeline: `source` (bytes) -> `protocol::parser::read_frame` (slot buffer)
//! -> digit and attribute tables -> `Reading`. `MeterStream` runs that loop
//! and turns per-frame failures into events so one bad frame never stops the
//! stream. Decoding is pure; all I/O lives in `source`.
//!
//! Invariants:
//! - Every frame is decoded from a freshly zeroed buffer; nothing carries over.
//! - A reading is only produced when all four digits are known patterns.
//! - Reserved attribute bits are reported by name, never interpreted.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use dmmwire_core::{MeterEvent, MeterStream, ReaderSource};
//!
//! let source = ReaderSource::open(Path::new("/dev/ttyUSB0"))?;
//! for event in MeterStream::new(source) {
//!     if let MeterEvent::Reading { reading, .. } = event? {
//!         println!("{reading}");
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod protocol;
mod reading;
mod source;
mod stream;

pub use protocol::attributes::{Attribute, AttributeSet, decode_attributes};
pub use protocol::digits::{Digit, DigitReading, decode_digit};
pub use protocol::error::{DecodeError, DecodeFrameError, FrameError};
pub use protocol::layout::{MAX_FRAME_ATTEMPTS, MIN_FRAME_BYTES, SLOT_COUNT};
pub use protocol::parser::{decode_frame_bytes, decode_reading, read_frame};
pub use protocol::reader::{FramingIndex, SlotBuffer};
pub use reading::Reading;
pub use source::{ByteSource, ReaderSource, SliceSource, SourceError};
pub use stream::{MeterEvent, MeterStream, StreamError, StreamStats};
