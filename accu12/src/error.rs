use thiserror::Error;

use crate::Field;

/// Everything that can go wrong with one instruction. None of these are
/// fatal: the machine reports the error and waits for the next instruction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MachineError {
    /// Wrong length, or something other than `0` and `1`.
    #[error("invalid {field} {token:?}: expected {} binary digits", .field.width())]
    MalformedToken { field: Field, token: String },
    /// Well formed, but not in the opcode table.
    #[error("invalid command {0:04b}")]
    UnknownOpcode(u8),
    #[error("overflow: {0} does not fit in a memory word")]
    ArithmeticOverflow(i32),
    #[error("underflow: {0} is below zero")]
    ArithmeticUnderflow(i32),
    #[error("division by zero")]
    DivisionByZero,
    /// The input source ran dry while we were waiting for a token.
    #[error("input ended while reading the {0}")]
    EndOfInput(Field),
}
