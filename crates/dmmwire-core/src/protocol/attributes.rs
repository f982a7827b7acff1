use std::fmt;

use serde::{Serialize, Serializer};

use super::layout;
use super::reader::SlotBuffer;

/// Mode and unit flags reported by the meter, in bit order.
///
/// The `Unknown*` variants are set by the meter but carry no documented
/// meaning; they are decoded and reported as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Attribute {
    Unknown11 = 0,
    Auto,
    Dc,
    Ac,
    Diode,
    Kilo,
    Nano,
    Micro,
    Beep,
    Mega,
    Percent,
    Milli,
    Hold,
    Rel,
    Ohms,
    Farads,
    UnknownD1,
    Hertz,
    Volts,
    Amps,
    UnknownE1,
    UnknownE2,
    DegreesC,
    UnknownE8,
}

impl Attribute {
    pub const ALL: [Attribute; layout::ATTRIBUTE_BITS] = [
        Attribute::Unknown11,
        Attribute::Auto,
        Attribute::Dc,
        Attribute::Ac,
        Attribute::Diode,
        Attribute::Kilo,
        Attribute::Nano,
        Attribute::Micro,
        Attribute::Beep,
        Attribute::Mega,
        Attribute::Percent,
        Attribute::Milli,
        Attribute::Hold,
        Attribute::Rel,
        Attribute::Ohms,
        Attribute::Farads,
        Attribute::UnknownD1,
        Attribute::Hertz,
        Attribute::Volts,
        Attribute::Amps,
        Attribute::UnknownE1,
        Attribute::UnknownE2,
        Attribute::DegreesC,
        Attribute::UnknownE8,
    ];

    pub fn bit(self) -> u32 {
        self as u32
    }

    pub fn mask(self) -> u32 {
        1 << self.bit()
    }

    /// Label used by the text rendering.
    ///
    /// Reserved bits keep the labels the meter's reference tool printed,
    /// including the odd `(unknown 0xD1)` for bit 16.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Unknown11 => "(unknown 11)",
            Attribute::Auto => "AUTO",
            Attribute::Dc => "DC",
            Attribute::Ac => "AC",
            Attribute::Diode => "DIODE",
            Attribute::Kilo => "kilo",
            Attribute::Nano => "nano",
            Attribute::Micro => "micro",
            Attribute::Beep => "beep",
            Attribute::Mega => "mega",
            Attribute::Percent => "Percent",
            Attribute::Milli => "mili",
            Attribute::Hold => "HOLD",
            Attribute::Rel => "REL",
            Attribute::Ohms => "Ohms",
            Attribute::Farads => "Farads",
            Attribute::UnknownD1 => "(unknown 0xD1)",
            Attribute::Hertz => "Hertz",
            Attribute::Volts => "Volts",
            Attribute::Amps => "Amps",
            Attribute::UnknownE1 => "(unknown E1)",
            Attribute::UnknownE2 => "(unknown E2)",
            Attribute::DegreesC => "DegreesC",
            Attribute::UnknownE8 => "(unknown E8)",
        }
    }

    /// True for bit positions with no known meaning.
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            Attribute::Unknown11
                | Attribute::UnknownD1
                | Attribute::UnknownE1
                | Attribute::UnknownE2
                | Attribute::UnknownE8
        )
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The 24 attribute flags of one frame, bit `n` = `Attribute::ALL[n]`.
///
/// # Examples
/// ```
/// use dmmwire_core::{Attribute, AttributeSet};
///
/// let set = AttributeSet::from_bits(Attribute::Auto.mask() | Attribute::Volts.mask());
/// assert!(set.contains(Attribute::Volts));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttributeSet(u32);

impl AttributeSet {
    const MASK: u32 = (1 << layout::ATTRIBUTE_BITS) - 1;

    pub fn empty() -> Self {
        Self(0)
    }

    /// Bits above position 23 are discarded.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & Self::MASK)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, attribute: Attribute) -> bool {
        self.0 & attribute.mask() != 0
    }

    pub fn insert(&mut self, attribute: Attribute) {
        self.0 |= attribute.mask();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Set attributes in bit order.
    pub fn iter(self) -> impl Iterator<Item = Attribute> {
        Attribute::ALL
            .into_iter()
            .filter(move |attribute| self.contains(*attribute))
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut set = AttributeSet::empty();
        for attribute in iter {
            set.insert(attribute);
        }
        set
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, attribute) in self.iter().enumerate() {
            if n > 0 {
                f.write_str(" ")?;
            }
            f.write_str(attribute.name())?;
        }
        Ok(())
    }
}

impl Serialize for AttributeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(Attribute::name))
    }
}

/// Gather the attribute bits from wire slots 1 and `0xA..=0xE`.
///
/// Each of those slots contributes four bits, concatenated low slot first.
/// Every nibble pattern is legal, so there is no error path.
pub fn decode_attributes(slots: &SlotBuffer) -> AttributeSet {
    let mut bits = 0u32;
    for bit in 0..layout::ATTRIBUTE_BITS {
        let group = bit / layout::BITS_PER_ATTRIBUTE_SLOT;
        let nibble = slots.attribute_nibble(group).unwrap_or(0);
        if nibble & (1 << (bit % layout::BITS_PER_ATTRIBUTE_SLOT)) != 0 {
            bits |= 1 << bit;
        }
    }
    AttributeSet::from_bits(bits)
}

#[cfg(test)]
mod tests {
    use super::{Attribute, AttributeSet, decode_attributes};
    use crate::protocol::reader::SlotBuffer;

    #[test]
    fn all_is_in_bit_order() {
        for (bit, attribute) in Attribute::ALL.iter().enumerate() {
            assert_eq!(attribute.bit() as usize, bit);
        }
    }

    #[test]
    fn reserved_positions() {
        let reserved: Vec<u32> = Attribute::ALL
            .iter()
            .filter(|attribute| attribute.is_reserved())
            .map(|attribute| attribute.bit())
            .collect();
        assert_eq!(reserved, vec![0, 16, 20, 21, 23]);
    }

    #[test]
    fn auto_and_volts_from_slots_one_and_d() {
        let mut nibbles = [0u8; 14];
        nibbles[0] = 0x2;
        nibbles[12] = 0x4;
        let set = decode_attributes(&SlotBuffer::from_nibbles(nibbles));
        let expected: AttributeSet = [Attribute::Auto, Attribute::Volts].into_iter().collect();
        assert_eq!(set, expected);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn digit_slots_do_not_leak_into_attributes() {
        let mut nibbles = [0xFu8; 14];
        nibbles[0] = 0;
        for slot in nibbles.iter_mut().skip(9) {
            *slot = 0;
        }
        assert!(decode_attributes(&SlotBuffer::from_nibbles(nibbles)).is_empty());
    }

    #[test]
    fn every_bit_set_gives_all_attributes() {
        let set = decode_attributes(&SlotBuffer::from_nibbles([0xF; 14]));
        assert_eq!(set.bits(), 0x00FF_FFFF);
        assert_eq!(set.iter().count(), 24);
    }

    #[test]
    fn from_bits_masks_high_byte() {
        assert_eq!(AttributeSet::from_bits(0xFF00_0001).bits(), 1);
    }

    #[test]
    fn display_joins_names_in_bit_order() {
        let set: AttributeSet = [Attribute::UnknownE8, Attribute::Kilo, Attribute::Ohms]
            .into_iter()
            .collect();
        assert_eq!(set.to_string(), "kilo Ohms (unknown E8)");
    }

    #[test]
    fn bit_sixteen_keeps_its_hex_label() {
        assert_eq!(Attribute::UnknownD1.name(), "(unknown 0xD1)");
        let set = AttributeSet::from_bits(Attribute::UnknownD1.mask() | Attribute::Hertz.mask());
        assert_eq!(set.to_string(), "(unknown 0xD1) Hertz");
    }

    #[test]
    fn serializes_as_name_list() {
        let set: AttributeSet = [Attribute::Ac, Attribute::Hold].into_iter().collect();
        let value = serde_json::to_value(set).expect("attributes json");
        assert_eq!(value, serde_json::json!(["AC", "HOLD"]));
    }
}
