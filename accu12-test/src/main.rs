use accu12::{
    Address, Machine, MachineError, Renderer, Report, RunOutcome, ScriptedInput, Word,
};
use anyhow::{ensure, Context, Result};
use log::*;

/// Logs everything instead of printing it, and keeps the reports and errors
/// so scenarios can check them afterwards.
#[derive(Default)]
struct LoggingRenderer {
    reports: Vec<Report>,
    errors: Vec<MachineError>,
}

impl Renderer for LoggingRenderer {
    fn show_memory(&mut self, memory: &[Word]) {
        info!("Memory: {memory:?}");
    }
    fn show_accumulator(&mut self, accumulator: Word) {
        info!("AC: {accumulator}");
    }
    fn report(&mut self, report: &Report) {
        info!("{report}");
        self.reports.push(report.clone());
    }
    fn report_error(&mut self, error: &MachineError) {
        warn!("{error}");
        self.errors.push(error.clone());
    }
}

struct Scenario {
    name: &'static str,
    /// Pokes the machine before any input is played back.
    seed: fn(&mut Machine) -> Result<()>,
    tokens: &'static [&'static str],
    expected_outcome: RunOutcome,
    expected_memory: [u8; 8],
    expected_accumulator: u8,
    check: fn(&LoggingRenderer) -> Result<()>,
}

fn no_seed(_machine: &mut Machine) -> Result<()> {
    Ok(())
}

fn no_check(_renderer: &LoggingRenderer) -> Result<()> {
    Ok(())
}

fn word(value: u8) -> Result<Word> {
    Word::new(value).with_context(|| format!("{value} doesn't fit in a word"))
}

fn address(index: usize) -> Result<Address> {
    Address::new(index).with_context(|| format!("there is no memory slot {index}"))
}

fn check_arithmetic(renderer: &LoggingRenderer) -> Result<()> {
    ensure!(
        renderer.errors
            == [
                MachineError::ArithmeticUnderflow(-15),
                MachineError::DivisionByZero
            ],
        "unexpected errors: {:?}",
        renderer.errors
    );
    ensure!(renderer.reports == [Report::Halting], "HALT wasn't reported");
    Ok(())
}

fn check_extremes(renderer: &LoggingRenderer) -> Result<()> {
    let expected = Report::Extremes {
        maximum: word(2)?,
        minimum: Word::ZERO,
    };
    ensure!(renderer.reports == [expected], "got {:?}", renderer.reports);
    Ok(())
}

fn seed_saturated(machine: &mut Machine) -> Result<()> {
    machine.set_memory_word(address(5)?, Word::MAX);
    Ok(())
}

fn check_overflows(renderer: &LoggingRenderer) -> Result<()> {
    ensure!(
        renderer.errors
            == [
                MachineError::ArithmeticOverflow(32),
                MachineError::ArithmeticOverflow(62)
            ],
        "unexpected errors: {:?}",
        renderer.errors
    );
    Ok(())
}

fn seed_ramp(machine: &mut Machine) -> Result<()> {
    machine.set_accumulator(word(9)?);
    for index in 2..8 {
        machine.set_memory_word(address(index)?, word(index as u8)?);
    }
    Ok(())
}

fn check_reserved(renderer: &LoggingRenderer) -> Result<()> {
    ensure!(
        renderer.errors == [MachineError::UnknownOpcode(0b0110)],
        "0110 should be rejected, got {:?}",
        renderer.errors
    );
    Ok(())
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "add, sub, underflow, divide by zero, halt",
        seed: no_seed,
        tokens: &[
            "0011", "000", "00011", // ADD 0, 3
            "0100", "000", "00010", // SUB 0, 2
            "0100", "001", "10001", // SUB 1, 17
            "0111", "000", "00000", // DIV 0, 0
            "0000", // HALT
            "0011", "000", "00011", // never read
        ],
        expected_outcome: RunOutcome::Halted,
        expected_memory: [2, 0, 0, 0, 0, 0, 0, 0],
        expected_accumulator: 0,
        check: check_arithmetic,
    },
    Scenario {
        name: "compare all",
        seed: no_seed,
        tokens: &["1001"],
        expected_outcome: RunOutcome::InputClosed,
        expected_memory: [1, 2, 0, 0, 0, 0, 0, 0],
        expected_accumulator: 0,
        check: check_extremes,
    },
    Scenario {
        name: "overflow keeps the old value",
        seed: seed_saturated,
        tokens: &[
            "0011", "101", "00001", // ADD 5, 1
            "0101", "101", "00010", // MUL 5, 2
            "0001", "101", // LOAD 5
        ],
        expected_outcome: RunOutcome::InputClosed,
        expected_memory: [1, 2, 0, 0, 0, 31, 0, 0],
        expected_accumulator: 31,
        check: check_overflows,
    },
    Scenario {
        name: "clear one, compare two, clear all",
        seed: seed_ramp,
        tokens: &[
            "1010", "011", // CLEAR_ONE 3
            "1000", "010", "111", // COMPARE_TWO 2, 7
            "1011", // CLEAR_ALL
        ],
        expected_outcome: RunOutcome::InputClosed,
        expected_memory: [0; 8],
        expected_accumulator: 9,
        check: no_check,
    },
    Scenario {
        name: "reserved opcode",
        seed: no_seed,
        tokens: &["0110", "0000"],
        expected_outcome: RunOutcome::Halted,
        expected_memory: [1, 2, 0, 0, 0, 0, 0, 0],
        expected_accumulator: 0,
        check: check_reserved,
    },
];

fn run_scenario(scenario: &Scenario) -> Result<()> {
    let mut machine = Machine::new();
    (scenario.seed)(&mut machine)?;
    debug!("Starting state: {machine:?}");
    let mut input = ScriptedInput::new(scenario.tokens.iter().copied());
    let mut renderer = LoggingRenderer::default();
    let outcome = machine.run(&mut input, &mut renderer);
    ensure!(
        outcome == scenario.expected_outcome,
        "ended with {outcome:?}, expected {:?}",
        scenario.expected_outcome
    );
    let memory: Vec<i32> = machine.memory().iter().map(|word| word.value()).collect();
    let expected_memory: Vec<i32> = scenario
        .expected_memory
        .iter()
        .map(|&value| i32::from(value))
        .collect();
    ensure!(
        memory == expected_memory,
        "memory is {memory:?}, expected {expected_memory:?}"
    );
    ensure!(
        machine.accumulator().value() == i32::from(scenario.expected_accumulator),
        "accumulator is {}, expected {}",
        machine.accumulator().value(),
        scenario.expected_accumulator
    );
    if outcome == RunOutcome::Halted {
        ensure!(
            machine.is_halted(),
            "run said halted but the machine disagrees"
        );
    }
    (scenario.check)(&renderer)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut failures = 0;
    for scenario in SCENARIOS {
        info!("=== {}", scenario.name);
        match run_scenario(scenario) {
            Ok(()) => info!("passed: {}", scenario.name),
            Err(error) => {
                error!("FAILED: {}: {error:#}", scenario.name);
                failures += 1;
            }
        }
    }
    ensure!(failures == 0, "{failures} of {} scenarios failed", SCENARIOS.len());
    println!("All {} scenarios passed.", SCENARIOS.len());
    Ok(())
}
