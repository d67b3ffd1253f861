use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{bits::to_int, Field, MachineError};

/// Every operation the machine knows, keyed by its four bit pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Halt,
    Load,
    Store,
    Add,
    Sub,
    Mul,
    Div,
    CompareTwo,
    CompareAll,
    ClearOne,
    ClearAll,
    /// A well formed pattern with no operation behind it. `0110` and
    /// `1100`..=`1111` land here.
    Invalid(u8),
}

impl Opcode {
    pub fn from_bits(bits: u8) -> Opcode {
        match bits & 0b1111 {
            0b0000 => Opcode::Halt,
            0b0001 => Opcode::Load,
            0b0010 => Opcode::Store,
            0b0011 => Opcode::Add,
            0b0100 => Opcode::Sub,
            0b0101 => Opcode::Mul,
            // 0b0110 is reserved
            0b0111 => Opcode::Div,
            0b1000 => Opcode::CompareTwo,
            0b1001 => Opcode::CompareAll,
            0b1010 => Opcode::ClearOne,
            0b1011 => Opcode::ClearAll,
            other => Opcode::Invalid(other),
        }
    }

    /// Parses an opcode token. Only a malformed token is an error; an
    /// unmapped pattern comes back as [`Opcode::Invalid`].
    pub fn parse(token: &str) -> Result<Opcode, MachineError> {
        if !crate::validate_binary(token, Field::Opcode.width()) {
            return Err(MachineError::MalformedToken {
                field: Field::Opcode,
                token: token.to_owned(),
            });
        }
        Ok(Opcode::from_bits(to_int(token) as u8))
    }

    pub fn bits(self) -> u8 {
        match self {
            Opcode::Halt => 0b0000,
            Opcode::Load => 0b0001,
            Opcode::Store => 0b0010,
            Opcode::Add => 0b0011,
            Opcode::Sub => 0b0100,
            Opcode::Mul => 0b0101,
            Opcode::Div => 0b0111,
            Opcode::CompareTwo => 0b1000,
            Opcode::CompareAll => 0b1001,
            Opcode::ClearOne => 0b1010,
            Opcode::ClearAll => 0b1011,
            Opcode::Invalid(bits) => bits,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Halt => "HALT",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::CompareTwo => "COMPARE_TWO",
            Opcode::CompareAll => "COMPARE_ALL",
            Opcode::ClearOne => "CLEAR_ONE",
            Opcode::ClearAll => "CLEAR_ALL",
            Opcode::Invalid(_) => "INVALID",
        }
    }

    /// Whether the operator types an address after the opcode.
    pub fn takes_address(self) -> bool {
        matches!(
            self,
            Opcode::Load
                | Opcode::Store
                | Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::CompareTwo
        )
    }

    /// Whether the operator types an operand after the address.
    pub fn takes_operand(self) -> bool {
        matches!(
            self,
            Opcode::Store | Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div
        )
    }

    /// Whether the handler asks for one more address while it executes.
    pub fn takes_follow_up_address(self) -> bool {
        matches!(self, Opcode::CompareTwo | Opcode::ClearOne)
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:04b}", self.bits())
    }
}
