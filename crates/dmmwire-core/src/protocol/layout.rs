/// Number of slots in a full frame (wire slots 1..=14).
pub const SLOT_COUNT: usize = 14;
/// Framing nibble of the byte that closes a frame.
pub const TERMINAL_INDEX: u8 = 0xE;
/// Minimum accepted bytes (terminal included); wire slot 1 may be omitted.
pub const MIN_FRAME_BYTES: usize = 13;
/// Byte pulls allowed before a frame is declared too long.
pub const MAX_FRAME_ATTEMPTS: usize = 15;
/// Byte the meter sends once when switched on.
pub const POWER_ON_BYTE: u8 = 0x00;

pub const FRAMING_SHIFT: u8 = 4;
pub const NIBBLE_MASK: u8 = 0x0F;

/// Number of digits on the display.
pub const DIGIT_COUNT: usize = 4;
/// 0-based slot holding the high nibble of the first digit.
pub const FIRST_DIGIT_SLOT: usize = 1;
/// High-nibble bit carrying the decimal point (or sign, on digit 1).
pub const POINT_FLAG: u8 = 0x8;
pub const SEGMENT_HIGH_MASK: u8 = 0x7;

/// Number of attribute bits assembled from the frame.
pub const ATTRIBUTE_BITS: usize = 24;
pub const BITS_PER_ATTRIBUTE_SLOT: usize = 4;
/// 0-based slot carrying attribute bits 0..4 (wire slot 1).
pub const LEADING_ATTRIBUTE_SLOT: usize = 0;
/// Added to `bit / 4` to locate attribute bits 4..24 (wire slots 0xA..=0xE).
pub const TRAILING_ATTRIBUTE_BASE: usize = 8;

/// Segment codes, indexed by `Digit` table position: 0..=9, `L`, blank.
pub const SEGMENT_TABLE: [u8; 12] = [
    0x7D, 0x05, 0x5B, 0x1F, 0x27, 0x3E, 0x7E, 0x15, 0x7F, 0x3F, 0x68, 0x00,
];
pub const OVER_RANGE_POSITION: usize = 10;
pub const BLANK_POSITION: usize = 11;
