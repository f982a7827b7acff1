use std::fmt;

use serde::Serialize;

use super::layout;

/// Validated 1-based slot position taken from a byte's high nibble.
///
/// Only values `1..=14` can be constructed, so conversion to 0-based storage
/// never under- or overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingIndex(u8);

impl FramingIndex {
    /// Extract the framing nibble of a wire byte, rejecting `0x0` and `0xF`.
    ///
    /// # Examples
    /// ```
    /// use dmmwire_core::FramingIndex;
    ///
    /// assert_eq!(FramingIndex::from_byte(0x3D).map(|i| i.get()), Some(3));
    /// assert!(FramingIndex::from_byte(0x0D).is_none());
    /// assert!(FramingIndex::from_byte(0xF0).is_none());
    /// ```
    pub fn from_byte(byte: u8) -> Option<Self> {
        let index = byte >> layout::FRAMING_SHIFT;
        if index == 0 || usize::from(index) > layout::SLOT_COUNT {
            return None;
        }
        Some(Self(index))
    }

    /// Wire position, `1..=14`.
    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_terminal(self) -> bool {
        self.0 == layout::TERMINAL_INDEX
    }

    fn storage(self) -> usize {
        usize::from(self.0) - 1
    }
}

/// Low nibble of a wire byte (the payload half).
pub fn payload_nibble(byte: u8) -> u8 {
    byte & layout::NIBBLE_MASK
}

/// The 14 nibbles of one frame, stored 0-based.
///
/// Slots never written by the wire (typically wire slot 1) read as zero.
///
/// # Examples
/// ```
/// use dmmwire_core::SlotBuffer;
///
/// let mut nibbles = [0u8; 14];
/// nibbles[1] = 0x7;
/// nibbles[2] = 0xD;
/// let slots = SlotBuffer::from_nibbles(nibbles);
/// assert_eq!(slots.slot(2), Some(0x7));
/// assert_eq!(slots.digit_pair(0), Some((0x7, 0xD)));
/// ```
///
/// Serializes as the plain list of 14 nibbles, wire slot 1 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SlotBuffer {
    slots: [u8; layout::SLOT_COUNT],
}

impl SlotBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from 0-based nibbles; high bits of each value are dropped.
    pub fn from_nibbles(nibbles: [u8; layout::SLOT_COUNT]) -> Self {
        Self {
            slots: nibbles.map(payload_nibble),
        }
    }

    pub(crate) fn store(&mut self, index: FramingIndex, nibble: u8) {
        self.slots[index.storage()] = payload_nibble(nibble);
    }

    /// Nibble at a 1-based wire position (`1..=14`).
    pub fn slot(&self, wire_index: usize) -> Option<u8> {
        let storage = wire_index.checked_sub(1)?;
        self.slots.get(storage).copied()
    }

    /// High and low nibble of a display digit (`0..4`, left to right).
    pub fn digit_pair(&self, digit: usize) -> Option<(u8, u8)> {
        if digit >= layout::DIGIT_COUNT {
            return None;
        }
        let high = layout::FIRST_DIGIT_SLOT + digit * 2;
        Some((self.slots[high], self.slots[high + 1]))
    }

    /// Nibble holding attribute bits `4 * group .. 4 * group + 4`.
    ///
    /// Group 0 is wire slot 1; groups 1..=5 are wire slots `0xA..=0xE`.
    pub fn attribute_nibble(&self, group: usize) -> Option<u8> {
        if group >= layout::ATTRIBUTE_BITS / layout::BITS_PER_ATTRIBUTE_SLOT {
            return None;
        }
        let storage = match group {
            0 => layout::LEADING_ATTRIBUTE_SLOT,
            _ => group + layout::TRAILING_ATTRIBUTE_BASE,
        };
        self.slots.get(storage).copied()
    }

    pub fn as_nibbles(&self) -> &[u8; layout::SLOT_COUNT] {
        &self.slots
    }
}

impl fmt::Display for SlotBuffer {
    /// Renders `1=0 2=7 3=D ...` using 1-based wire positions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (storage, nibble) in self.slots.iter().enumerate() {
            if storage > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:X}={:X}", storage + 1, nibble)?;
        }
        Ok(())
    }
}
