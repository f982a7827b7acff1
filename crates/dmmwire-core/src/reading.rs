use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::protocol::attributes::AttributeSet;
use crate::protocol::digits::{Digit, DigitReading};
use crate::protocol::layout;

/// One decoded meter sample: four display digits plus mode attributes.
///
/// Text rendering follows the display: `-` before the first digit when its
/// flag is set, `.` before later digits with the flag set, `L` for
/// over-range, space for blank, then the set attribute names.
///
/// # Examples
/// ```
/// use dmmwire_core::decode_frame_bytes;
///
/// let bytes = [
///     0x27, 0x3D, 0x42, 0x57, 0x69, 0x75, 0x80, 0x95, 0xA2, 0xB0, 0xC4, 0xD0, 0xE8,
/// ];
/// let reading = decode_frame_bytes(&bytes)?;
/// assert_eq!(reading.to_string(), "04.71 kilo Ohms (unknown E8)");
/// assert_eq!(reading.value(), Some(4.71));
/// # Ok::<(), dmmwire_core::DecodeFrameError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    digits: [DigitReading; layout::DIGIT_COUNT],
    attributes: AttributeSet,
}

impl Reading {
    pub fn new(digits: [DigitReading; layout::DIGIT_COUNT], attributes: AttributeSet) -> Self {
        Self { digits, attributes }
    }

    pub fn digits(&self) -> &[DigitReading; layout::DIGIT_COUNT] {
        &self.digits
    }

    pub fn attributes(&self) -> AttributeSet {
        self.attributes
    }

    /// True when the first digit's flag (the minus sign) is set.
    pub fn is_negative(&self) -> bool {
        self.digits[0].point
    }

    pub fn is_over_range(&self) -> bool {
        self.digits
            .iter()
            .any(|reading| reading.digit == Digit::OverRange)
    }

    /// Numeric part as shown on the display, e.g. `04.71` or `-1.234`.
    pub fn display(&self) -> String {
        let mut text = String::with_capacity(layout::DIGIT_COUNT + 1);
        for (position, reading) in self.digits.iter().enumerate() {
            if reading.point {
                text.push(if position == 0 { '-' } else { '.' });
            }
            text.push(reading.digit.as_char());
        }
        text
    }

    /// Displayed number, ignoring blanks.
    ///
    /// `None` when the meter shows over-range or no digit at all.
    pub fn value(&self) -> Option<f64> {
        if self.is_over_range() {
            return None;
        }
        if !self
            .digits
            .iter()
            .any(|reading| matches!(reading.digit, Digit::Numeral(_)))
        {
            return None;
        }
        let text: String = self.display().chars().filter(|c| *c != ' ').collect();
        text.parse().ok()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())?;
        if !self.attributes.is_empty() {
            write!(f, " {}", self.attributes)?;
        }
        Ok(())
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Reading", 5)?;
        state.serialize_field("display", &self.display())?;
        state.serialize_field("value", &self.value())?;
        state.serialize_field("over_range", &self.is_over_range())?;
        state.serialize_field("digits", &self.digits)?;
        state.serialize_field("attributes", &self.attributes)?;
        state.end()
    }
}
