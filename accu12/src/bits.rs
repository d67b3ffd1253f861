//! Bit-string validation and the fixed-width fields of an instruction.
//!
//! Everything the operator types is a string of `0`s and `1`s. Nothing in
//! here interprets a token as a number until [`validate_binary`] has said
//! it's well formed.

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

use crate::MachineError;

pub const OPCODE_BITS: usize = 4;
pub const ADDRESS_BITS: usize = 3;
pub const WORD_BITS: usize = 5;
pub const INSTRUCTION_BITS: usize = OPCODE_BITS + ADDRESS_BITS + WORD_BITS;

/// One past the largest value a word can hold.
pub const WORD_LIMIT: i32 = 1 << WORD_BITS;

/// Which part of an instruction a token belongs to. Also tells an
/// [`InputSource`](crate::InputSource) what it's being asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Opcode,
    Address,
    Operand,
    /// The extra address COMPARE_TWO asks for while it executes.
    OtherAddress,
    /// A whole assembled instruction.
    Instruction,
}

impl Field {
    /// How many binary digits a token for this field must have.
    pub fn width(self) -> usize {
        match self {
            Field::Opcode => OPCODE_BITS,
            Field::Address | Field::OtherAddress => ADDRESS_BITS,
            Field::Operand => WORD_BITS,
            Field::Instruction => INSTRUCTION_BITS,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Field::Opcode => "opcode",
            Field::Address => "address",
            Field::Operand => "operand",
            Field::OtherAddress => "other address",
            Field::Instruction => "instruction",
        })
    }
}

/// True iff `token` is exactly `expected_length` characters, all of them
/// `0` or `1`.
pub fn validate_binary(token: &str, expected_length: usize) -> bool {
    token.len() == expected_length && token.bytes().all(|ch| ch == b'0' || ch == b'1')
}

/// Base-2 decoding of an already validated bit string.
pub fn to_int(bits: &str) -> i32 {
    debug_assert!(bits.len() < 32, "{bits:?} is too wide to decode");
    bits.bytes()
        .fold(0, |value, ch| (value << 1) | i32::from(ch == b'1'))
}

/// Encodes `value` as exactly `width` binary digits, left-padded with zeros.
///
/// If `value` needs more than `width` digits, the second element is `true`
/// and the string is all zeros rather than a truncation. Negative values
/// always come back as overflowed.
pub fn to_fixed_width(value: i32, width: usize) -> (String, bool) {
    let bits = format!("{value:0width$b}");
    if value < 0 || bits.len() > width {
        return ("0".repeat(width), true);
    }
    (bits, false)
}

/// Checks `token` against `field`'s width and decodes it.
fn parse_field(token: &str, field: Field) -> Result<i32, MachineError> {
    if !validate_binary(token, field.width()) {
        return Err(MachineError::MalformedToken {
            field,
            token: token.to_owned(),
        });
    }
    Ok(to_int(token))
}

/// A five bit memory word. Always in `0..=31`.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word(u8);

impl Word {
    pub const ZERO: Word = Word(0);
    pub const MAX: Word = Word((WORD_LIMIT - 1) as u8);

    /// Keeps only the low five bits of `value`.
    pub(crate) const fn from_raw(value: u8) -> Word {
        Word(value & Word::MAX.0)
    }

    /// The word holding `value`, if it fits.
    pub fn new(value: u8) -> Option<Word> {
        Word::encode(i32::from(value)).ok()
    }

    /// Parses an operand token.
    pub fn parse(token: &str) -> Result<Word, MachineError> {
        parse_field(token, Field::Operand).map(|value| Word(value as u8))
    }

    /// Range-checks an arithmetic result. Negative results are an underflow,
    /// anything that needs a sixth bit is an overflow.
    pub fn encode(value: i32) -> Result<Word, MachineError> {
        if value < 0 {
            return Err(MachineError::ArithmeticUnderflow(value));
        }
        let (bits, overflowed) = to_fixed_width(value, WORD_BITS);
        if overflowed {
            return Err(MachineError::ArithmeticOverflow(value));
        }
        Ok(Word(to_int(&bits) as u8))
    }

    pub fn value(self) -> i32 {
        i32::from(self.0)
    }

    /// The canonical five character form, e.g. `00101`.
    pub fn bits(self) -> String {
        to_fixed_width(self.value(), WORD_BITS).0
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.bits())
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Word({})", self.bits())
    }
}

/// A three bit memory address. Being three bits wide, it can't point outside
/// of memory.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u8);

impl Address {
    /// Parses an address token. `field` says which address slot it came from,
    /// for the error message.
    pub fn parse(token: &str, field: Field) -> Result<Address, MachineError> {
        debug_assert_eq!(field.width(), ADDRESS_BITS);
        parse_field(token, field).map(|value| Address(value as u8))
    }

    /// The address of memory slot `index`, if there is such a slot.
    pub fn new(index: usize) -> Option<Address> {
        if index < 1 << ADDRESS_BITS {
            Some(Address(index as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn bits(self) -> String {
        to_fixed_width(i32::from(self.0), ADDRESS_BITS).0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.bits())
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Address({})", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn validate_binary_rejects_bad_tokens() {
        assert!(validate_binary("00101", 5));
        assert!(validate_binary("", 0));
        assert!(!validate_binary("", 5));
        assert!(!validate_binary("0010", 5));
        assert!(!validate_binary("001011", 5));
        assert!(!validate_binary("00201", 5));
        assert!(!validate_binary("0010 ", 5));
        assert!(!validate_binary("abc", 3));
    }

    #[test]
    fn fixed_width_pads_and_overflows() {
        assert_eq!(to_fixed_width(4, 5), ("00100".to_string(), false));
        assert_eq!(to_fixed_width(31, 5), ("11111".to_string(), false));
        assert_eq!(to_fixed_width(32, 5), ("00000".to_string(), true));
        assert_eq!(to_fixed_width(0, 3), ("000".to_string(), false));
        assert_eq!(to_fixed_width(-1, 5), ("00000".to_string(), true));
    }

    #[test]
    fn word_encode_classifies_out_of_range() {
        assert_eq!(Word::encode(0), Ok(Word::ZERO));
        assert_eq!(Word::encode(31), Ok(Word::MAX));
        assert_eq!(Word::encode(32), Err(MachineError::ArithmeticOverflow(32)));
        assert_eq!(
            Word::encode(-15),
            Err(MachineError::ArithmeticUnderflow(-15))
        );
    }

    #[test]
    fn parse_reports_the_field() {
        assert_eq!(Word::parse("10001").map(Word::value), Ok(17));
        assert_eq!(
            Address::parse("12", Field::OtherAddress),
            Err(MachineError::MalformedToken {
                field: Field::OtherAddress,
                token: "12".to_string(),
            })
        );
        assert_eq!(Address::parse("111", Field::Address).map(Address::index), Ok(7));
        assert_eq!(Address::new(8), None);
    }

    proptest! {
        #[test]
        fn validate_binary_matches_definition(token in "[01a ]{0,7}", expected_length in 0usize..8) {
            let expected = token.len() == expected_length
                && token.chars().all(|ch| ch == '0' || ch == '1');
            prop_assert_eq!(validate_binary(&token, expected_length), expected);
        }

        #[test]
        fn fixed_width_decodes_back(value in 0i32..4096, width in 1usize..13) {
            let (bits, overflowed) = to_fixed_width(value, width);
            prop_assert_eq!(bits.len(), width);
            prop_assert_eq!(overflowed, value >= 1 << width);
            if !overflowed {
                prop_assert_eq!(to_int(&bits), value);
            }
        }
    }
}
