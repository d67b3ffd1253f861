//! Layout of a twelve bit instruction:
//!
//! ```text
//! 0000 000 00000
//! ^^^^ ^^^ ^^^^^
//!  |    |    operand (5 bits)
//!  |    address (3 bits)
//!  opcode (4 bits)
//! ```

use super::Opcode;
use crate::{bits::*, MachineError};

pub const ADDRESS_PLACEHOLDER: &str = "000";
pub const OPERAND_PLACEHOLDER: &str = "00000";

/// Glues the fields back into a twelve character instruction. Fields the
/// opcode doesn't take are filled with zeros.
pub fn assemble(opcode: Opcode, address: Option<Address>, operand: Option<Word>) -> String {
    let mut instruction = String::with_capacity(INSTRUCTION_BITS);
    instruction.push_str(&opcode.to_string());
    match address {
        Some(address) => instruction.push_str(&address.bits()),
        None => instruction.push_str(ADDRESS_PLACEHOLDER),
    }
    match operand {
        Some(operand) => instruction.push_str(&operand.bits()),
        None => instruction.push_str(OPERAND_PLACEHOLDER),
    }
    instruction
}

/// Splits an instruction into its opcode, address and operand fields,
/// without interpreting them.
pub fn split(instruction: &str) -> Result<(&str, &str, &str), MachineError> {
    if !validate_binary(instruction, INSTRUCTION_BITS) {
        return Err(MachineError::MalformedToken {
            field: Field::Instruction,
            token: instruction.to_owned(),
        });
    }
    let (opcode, rest) = instruction.split_at(OPCODE_BITS);
    let (address, operand) = rest.split_at(ADDRESS_BITS);
    Ok((opcode, address, operand))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_fill_missing_fields() {
        assert_eq!(assemble(Opcode::Halt, None, None), "000000000000");
        assert_eq!(
            assemble(Opcode::CompareTwo, Address::new(5), None),
            "100010100000"
        );
        assert_eq!(
            assemble(Opcode::Add, Address::new(0), Word::encode(3).ok()),
            "001100000011"
        );
    }

    #[test]
    fn split_checks_the_whole_instruction() {
        assert_eq!(split("010000110001"), Ok(("0100", "001", "10001")));
        assert!(split("01000011000").is_err());
        assert!(split("0100001100012").is_err());
        assert!(split("01000011000x").is_err());
    }
}
