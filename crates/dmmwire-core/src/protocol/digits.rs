use serde::Serialize;

use super::error::DecodeError;
use super::layout;

/// One display position after segment decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Digit {
    /// A decimal digit, `0..=9`.
    Numeral(u8),
    /// `L`, shown when the input exceeds the selected range.
    OverRange,
    Blank,
}

impl Digit {
    /// Look a 7-bit segment code up in the digit table.
    ///
    /// # Examples
    /// ```
    /// use dmmwire_core::Digit;
    ///
    /// assert_eq!(Digit::from_segments(0x7D), Ok(Digit::Numeral(0)));
    /// assert_eq!(Digit::from_segments(0x68), Ok(Digit::OverRange));
    /// assert!(Digit::from_segments(0xFF).is_err());
    /// ```
    ///
    /// # Errors
    /// Returns `DecodeError::UnknownDigit` when the code is not in the table.
    pub fn from_segments(code: u8) -> Result<Self, DecodeError> {
        let position = layout::SEGMENT_TABLE
            .iter()
            .position(|&entry| entry == code)
            .ok_or(DecodeError::UnknownDigit { code })?;
        Ok(match position {
            layout::OVER_RANGE_POSITION => Digit::OverRange,
            layout::BLANK_POSITION => Digit::Blank,
            numeral => Digit::Numeral(numeral as u8),
        })
    }

    /// Display glyph; a `Numeral` outside `0..=9` renders as `?`.
    pub fn as_char(self) -> char {
        match self {
            Digit::Numeral(value) => char::from_digit(u32::from(value), 10).unwrap_or('?'),
            Digit::OverRange => 'L',
            Digit::Blank => ' ',
        }
    }
}

/// A decoded digit plus the point flag carried in its high nibble.
///
/// On the first digit the flag is the minus sign; on the others it is a
/// decimal point in front of the digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigitReading {
    pub digit: Digit,
    pub point: bool,
}

/// Decode the slot pair of one display digit.
///
/// The segment code is `((high & 0x7) << 4) | low`; bit 3 of `high` is the
/// point/sign flag and is not part of the code.
///
/// # Errors
/// Returns `DecodeError::UnknownDigit` when the reconstructed code is not a
/// known digit, over-range, or blank pattern.
pub fn decode_digit(high: u8, low: u8) -> Result<DigitReading, DecodeError> {
    let code = ((high & layout::SEGMENT_HIGH_MASK) << 4) | (low & layout::NIBBLE_MASK);
    let digit = Digit::from_segments(code)?;
    Ok(DigitReading {
        digit,
        point: high & layout::POINT_FLAG != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::{Digit, DigitReading, decode_digit};
    use crate::protocol::error::DecodeError;
    use crate::protocol::layout;

    #[test]
    fn table_covers_all_numerals() {
        for (value, code) in layout::SEGMENT_TABLE.iter().take(10).enumerate() {
            assert_eq!(Digit::from_segments(*code), Ok(Digit::Numeral(value as u8)));
        }
    }

    #[test]
    fn over_range_and_blank_codes() {
        assert_eq!(Digit::from_segments(0x68), Ok(Digit::OverRange));
        assert_eq!(Digit::from_segments(0x00), Ok(Digit::Blank));
    }

    #[test]
    fn unknown_code_is_an_error() {
        assert_eq!(
            Digit::from_segments(0xFF),
            Err(DecodeError::UnknownDigit { code: 0xFF })
        );
    }

    #[test]
    fn decode_zero_from_nibbles() {
        let reading = decode_digit(0x7, 0xD).unwrap();
        assert_eq!(
            reading,
            DigitReading {
                digit: Digit::Numeral(0),
                point: false
            }
        );
    }

    #[test]
    fn point_flag_is_excluded_from_code() {
        let reading = decode_digit(0x9, 0x5).unwrap();
        assert_eq!(reading.digit, Digit::Numeral(7));
        assert!(reading.point);
    }

    #[test]
    fn decode_unknown_nibbles_reports_code() {
        let err = decode_digit(0x1, 0x1).unwrap_err();
        assert_eq!(err, DecodeError::UnknownDigit { code: 0x11 });
        assert!(err.to_string().contains("0x11"));
    }

    #[test]
    fn chars_render_display_glyphs() {
        assert_eq!(Digit::Numeral(7).as_char(), '7');
        assert_eq!(Digit::OverRange.as_char(), 'L');
        assert_eq!(Digit::Blank.as_char(), ' ');
    }

    #[test]
    fn out_of_range_numeral_renders_placeholder() {
        assert_eq!(Digit::Numeral(10).as_char(), '?');
        assert_eq!(Digit::Numeral(255).as_char(), '?');
    }
}
