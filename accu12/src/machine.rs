use std::fmt::{Debug, Formatter, Result as FmtResult};

use log::*;

use crate::{Address, Field, InputSource, MachineError, Renderer, Report, Word};

mod instruction;
pub use instruction::*;
mod opcode;
pub use opcode::Opcode;


pub const MEMORY_SIZE: usize = 8;

/// What memory looks like when the machine is switched on.
const INITIAL_MEMORY: [Word; MEMORY_SIZE] = [
    Word::from_raw(0b00001),
    Word::from_raw(0b00010),
    Word::ZERO,
    Word::ZERO,
    Word::ZERO,
    Word::ZERO,
    Word::ZERO,
    Word::ZERO,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Running,
    /// Terminal. Only HALT gets us here.
    Halted,
}

/// Whether the request loop should ask for another instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// Why [`Machine::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Halted,
    InputClosed,
}

/// What to do with the target slot when an arithmetic result doesn't fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutOfRange {
    /// Leave the previous value where it was.
    Keep,
    /// Clear the slot to zero.
    Clear,
}

pub struct Machine {
    /// Eight words of memory, indexed by a three bit address.
    memory: [Word; MEMORY_SIZE],
    /// The accumulator. Only LOAD writes to it.
    accumulator: Word,
    state: State,
}

impl Debug for Machine {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "AC:{} MEM:", self.accumulator)?;
        for word in &self.memory {
            write!(fmt, " {word}")?;
        }
        if self.state == State::Halted {
            write!(fmt, " (halted)")?;
        }
        Ok(())
    }
}

impl Default for Machine {
    fn default() -> Machine {
        Machine::new()
    }
}

impl Machine {
    pub fn new() -> Machine {
        return Machine {
            memory: INITIAL_MEMORY,
            accumulator: Word::ZERO,
            state: State::Running,
        };
    }

    /// Asks `input` for the tokens of one instruction and assembles them.
    ///
    /// The opcode always comes first. Then an address and an operand, but
    /// only if the opcode takes them. Each token is validated as soon as it
    /// arrives, and the first bad one abandons the whole instruction.
    pub fn fetch_instruction<I: InputSource>(input: &mut I) -> Result<String, MachineError> {
        let opcode = Opcode::parse(&request_token(input, Field::Opcode)?)?;
        let address = if opcode.takes_address() {
            Some(Address::parse(
                &request_token(input, Field::Address)?,
                Field::Address,
            )?)
        } else {
            None
        };
        let operand = if opcode.takes_operand() {
            Some(Word::parse(&request_token(input, Field::Operand)?)?)
        } else {
            None
        };
        if opcode.takes_follow_up_address() {
            trace!("{} will ask for one more address", opcode.mnemonic());
        }
        Ok(assemble(opcode, address, operand))
    }

    /// One full fetch, decode and execute cycle. Returns `None` if the input
    /// ran out before a complete instruction was read.
    pub fn step<I: InputSource, R: Renderer>(
        &mut self,
        input: &mut I,
        renderer: &mut R,
    ) -> Option<Flow> {
        if self.is_halted() {
            warn!("Asked to step a halted machine. Not asking for input.");
            return Some(Flow::Halt);
        }
        let instruction = match Machine::fetch_instruction(input) {
            Ok(instruction) => instruction,
            Err(MachineError::EndOfInput(field)) => {
                debug!("Input ended while waiting for the {field}");
                return None;
            }
            Err(error) => {
                warn!("Abandoning instruction: {error}");
                renderer.report_error(&error);
                return Some(Flow::Continue);
            }
        };
        Some(self.decode_and_execute(&instruction, input, renderer))
    }

    /// Steps until HALT, or until the input runs dry.
    pub fn run<I: InputSource, R: Renderer>(
        &mut self,
        input: &mut I,
        renderer: &mut R,
    ) -> RunOutcome {
        loop {
            match self.step(input, renderer) {
                Some(Flow::Continue) => (),
                Some(Flow::Halt) => return RunOutcome::Halted,
                None => return RunOutcome::InputClosed,
            }
        }
    }

    /// Executes a twelve bit instruction. Every error is reported to
    /// `renderer` and leaves the machine running; only HALT stops it.
    ///
    /// `input` is only consulted by COMPARE_TWO and CLEAR_ONE, which need one
    /// more address than the instruction has room for.
    pub fn decode_and_execute<I: InputSource, R: Renderer>(
        &mut self,
        instruction: &str,
        input: &mut I,
        renderer: &mut R,
    ) -> Flow {
        if self.is_halted() {
            warn!("Ignoring {instruction:?}, the machine is halted");
            return Flow::Halt;
        }
        match self.execute(instruction, input, renderer) {
            Ok(flow) => flow,
            Err(error) => {
                warn!("{instruction}: {error}");
                renderer.report_error(&error);
                Flow::Continue
            }
        }
    }

    fn execute<I: InputSource, R: Renderer>(
        &mut self,
        instruction: &str,
        input: &mut I,
        renderer: &mut R,
    ) -> Result<Flow, MachineError> {
        let (opcode, address, operand) = split(instruction)?;
        let opcode = Opcode::parse(opcode)?;
        // Three bits can only ever name one of the eight slots.
        let address = Address::parse(address, Field::Address)?;
        debug!(
            "{} address={address} operand={operand} | {:?}",
            opcode.mnemonic(),
            self
        );
        match opcode {
            Opcode::Halt => {
                renderer.report(&Report::Halting);
                renderer.show_memory(&self.memory);
                self.state = State::Halted;
                info!("Halted: {:?}", self);
                return Ok(Flow::Halt);
            }
            Opcode::Load => self.load(address, renderer),
            Opcode::Store => self.store(address, operand, renderer)?,
            Opcode::Add => {
                self.perform_arithmetic(address, operand, renderer, OutOfRange::Keep, |a, b| {
                    Ok(a + b)
                })?
            }
            // Unlike the others, a SUB that doesn't fit clears the slot.
            Opcode::Sub => {
                self.perform_arithmetic(address, operand, renderer, OutOfRange::Clear, |a, b| {
                    Ok(a - b)
                })?
            }
            Opcode::Mul => {
                self.perform_arithmetic(address, operand, renderer, OutOfRange::Keep, |a, b| {
                    Ok(a * b)
                })?
            }
            Opcode::Div => {
                self.perform_arithmetic(address, operand, renderer, OutOfRange::Keep, |a, b| {
                    if b == 0 {
                        Err(MachineError::DivisionByZero)
                    } else {
                        Ok(a / b)
                    }
                })?
            }
            Opcode::CompareTwo => self.compare_two(address, input, renderer)?,
            Opcode::CompareAll => self.compare_all(renderer),
            Opcode::ClearOne => self.clear_one(input, renderer)?,
            Opcode::ClearAll => self.clear_all(renderer),
            Opcode::Invalid(bits) => return Err(MachineError::UnknownOpcode(bits)),
        }
        Ok(Flow::Continue)
    }

    fn load<R: Renderer>(&mut self, address: Address, renderer: &mut R) {
        self.accumulator = self.memory[address.index()];
        renderer.show_accumulator(self.accumulator);
    }

    fn store<R: Renderer>(
        &mut self,
        address: Address,
        operand: &str,
        renderer: &mut R,
    ) -> Result<(), MachineError> {
        self.memory[address.index()] = Word::parse(operand)?;
        renderer.show_memory(&self.memory);
        Ok(())
    }

    /// Applies `operation` to the word at `address` and the operand, and
    /// stores the result there if it fits in a word. Memory gets rendered
    /// either way, but only once the operand has checked out.
    fn perform_arithmetic<R, F>(
        &mut self,
        address: Address,
        operand: &str,
        renderer: &mut R,
        out_of_range: OutOfRange,
        operation: F,
    ) -> Result<(), MachineError>
    where
        R: Renderer,
        F: FnOnce(i32, i32) -> Result<i32, MachineError>,
    {
        let operand = Word::parse(operand)?;
        let slot = &mut self.memory[address.index()];
        match operation(slot.value(), operand.value()).and_then(Word::encode) {
            Ok(result) => *slot = result,
            Err(error) => {
                let is_range_error = matches!(
                    error,
                    MachineError::ArithmeticOverflow(_) | MachineError::ArithmeticUnderflow(_)
                );
                if is_range_error && out_of_range == OutOfRange::Clear {
                    *slot = Word::ZERO;
                }
                warn!("Memory[{}] {slot} with operand {operand}: {error}", address.index());
                renderer.report_error(&error);
            }
        }
        renderer.show_memory(&self.memory);
        Ok(())
    }

    fn compare_two<I: InputSource, R: Renderer>(
        &mut self,
        first: Address,
        input: &mut I,
        renderer: &mut R,
    ) -> Result<(), MachineError> {
        let second = Address::parse(
            &request_token(input, Field::OtherAddress)?,
            Field::OtherAddress,
        )?;
        let first_value = self.memory[first.index()];
        let second_value = self.memory[second.index()];
        renderer.report(&Report::Compared {
            first,
            first_value,
            second,
            second_value,
            ordering: first_value.value().cmp(&second_value.value()),
        });
        Ok(())
    }

    fn compare_all<R: Renderer>(&self, renderer: &mut R) {
        // Seeded at opposite ends of the word range, so the first word
        // tightens both.
        let (maximum, minimum) = self
            .memory
            .iter()
            .fold((Word::ZERO, Word::MAX), |(maximum, minimum), &word| {
                (maximum.max(word), minimum.min(word))
            });
        renderer.report(&Report::Extremes { maximum, minimum });
    }

    fn clear_one<I: InputSource, R: Renderer>(
        &mut self,
        input: &mut I,
        renderer: &mut R,
    ) -> Result<(), MachineError> {
        let address = Address::parse(&request_token(input, Field::Address)?, Field::Address)?;
        self.memory[address.index()] = Word::ZERO;
        renderer.report(&Report::Cleared(address));
        renderer.show_memory(&self.memory);
        Ok(())
    }

    fn clear_all<R: Renderer>(&mut self, renderer: &mut R) {
        self.memory = [Word::ZERO; MEMORY_SIZE];
        renderer.report(&Report::ClearedAll);
        renderer.show_memory(&self.memory);
    }

    // Ways to inspect the state of the machine, for rendering and tests.
    pub fn memory(&self) -> &[Word; MEMORY_SIZE] {
        &self.memory
    }
    pub fn accumulator(&self) -> Word {
        self.accumulator
    }
    pub fn state(&self) -> State {
        self.state
    }
    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }
    // The machine has no instruction for either of these, so we'll feature
    // gate them.
    #[cfg(feature = "override-state")]
    pub fn set_accumulator(&mut self, nu: Word) {
        self.accumulator = nu
    }
    #[cfg(feature = "override-state")]
    pub fn set_memory_word(&mut self, address: Address, nu: Word) {
        self.memory[address.index()] = nu
    }
}

fn request_token<I: InputSource>(input: &mut I, field: Field) -> Result<String, MachineError> {
    trace!("Requesting the {field} ({} bits)", field.width());
    input
        .next_token(field)
        .ok_or(MachineError::EndOfInput(field))
}
