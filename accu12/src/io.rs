//! The machine's two collaborators: where tokens come from, and where the
//! results go.

use std::{
    cmp::Ordering,
    collections::VecDeque,
    fmt::{Display, Formatter, Result as FmtResult},
};

use crate::{Address, Field, MachineError, Word};

pub trait InputSource {
    /// Hands over the next raw token for `field`, or `None` once there is no
    /// more input. The token is passed along untrimmed and unvalidated.
    fn next_token(&mut self, field: Field) -> Option<String>;
}

/// Something a handler wants the operator to know, other than a memory or
/// accumulator snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Report {
    /// COMPARE_TWO's verdict. `ordering` is `first_value` compared to
    /// `second_value`.
    Compared {
        first: Address,
        first_value: Word,
        second: Address,
        second_value: Word,
        ordering: Ordering,
    },
    /// COMPARE_ALL's verdict.
    Extremes { maximum: Word, minimum: Word },
    Cleared(Address),
    ClearedAll,
    Halting,
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Report::Compared {
                first,
                first_value,
                second,
                second_value,
                ordering,
            } => {
                let (a, b) = (first.index(), second.index());
                writeln!(f, "Memory[{a}] = {first_value} and Memory[{b}] = {second_value}")?;
                match ordering {
                    Ordering::Greater => write!(f, "Memory[{a}] is greater than Memory[{b}]"),
                    Ordering::Less => write!(f, "Memory[{a}] is less than Memory[{b}]"),
                    Ordering::Equal => write!(f, "Memory[{a}] is equal to Memory[{b}]"),
                }
            }
            Report::Extremes { maximum, minimum } => write!(
                f,
                "Largest value in memory: {}, smallest value in memory: {}",
                maximum.value(),
                minimum.value()
            ),
            Report::Cleared(address) => write!(f, "Memory[{}] cleared!", address.index()),
            Report::ClearedAll => f.write_str("Memory cleared!"),
            Report::Halting => f.write_str("Shutting down..."),
        }
    }
}

/// Where the machine shows its work.
pub trait Renderer {
    fn show_memory(&mut self, memory: &[Word]);
    fn show_accumulator(&mut self, accumulator: Word);
    fn report(&mut self, report: &Report);
    fn report_error(&mut self, error: &MachineError);
}

/// An [`InputSource`] that plays back a fixed list of tokens, ignoring which
/// field is being asked for.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    tokens: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(tokens: I) -> ScriptedInput
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedInput {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// How many tokens haven't been asked for yet.
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_token(&mut self, _field: Field) -> Option<String> {
        self.tokens.pop_front()
    }
}
