use std::io::{self, BufRead, Write};

use accu12::{Field, InputSource, MachineError, Renderer, Report, Word};
use anyhow::Context;
use log::*;

/// Reads one token per line, printing a prompt for each.
pub struct StdinSource<R: BufRead, W: Write> {
    reader: R,
    prompt_out: W,
    echo: bool,
    /// The first I/O error we hit. After that, we pretend input has ended.
    failure: Option<io::Error>,
}

impl<R: BufRead, W: Write> StdinSource<R, W> {
    pub fn new(reader: R, prompt_out: W, echo: bool) -> Self {
        StdinSource {
            reader,
            prompt_out,
            echo,
            failure: None,
        }
    }

    /// Surfaces any I/O error that cut the input short.
    pub fn finish(self) -> anyhow::Result<()> {
        match self.failure {
            Some(error) => Err(error).context("failed to read from the console"),
            None => Ok(()),
        }
    }

    fn read_token(&mut self, field: Field) -> io::Result<Option<String>> {
        write!(
            self.prompt_out,
            "Enter the {field} ({} bits): ",
            field.width()
        )?;
        self.prompt_out.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            // end of file
            writeln!(self.prompt_out)?;
            return Ok(None);
        }
        let token = line.trim_end_matches(['\r', '\n']).to_owned();
        if self.echo {
            writeln!(self.prompt_out, "{token}")?;
        }
        Ok(Some(token))
    }
}

impl<R: BufRead, W: Write> InputSource for StdinSource<R, W> {
    fn next_token(&mut self, field: Field) -> Option<String> {
        if self.failure.is_some() {
            return None;
        }
        match self.read_token(field) {
            Ok(token) => token,
            Err(error) => {
                error!("Console went away while reading the {field}: {error}");
                self.failure = Some(error);
                None
            }
        }
    }
}

/// Prints machine state as plain text lines.
pub struct ConsoleRenderer<W: Write> {
    out: W,
    failure: Option<io::Error>,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        ConsoleRenderer { out, failure: None }
    }

    pub fn finish(mut self) -> anyhow::Result<()> {
        if self.failure.is_none() {
            if let Err(error) = self.out.flush() {
                self.failure = Some(error);
            }
        }
        match self.failure {
            Some(error) => Err(error).context("failed to write to the console"),
            None => Ok(()),
        }
    }

    fn emit(&mut self, line: std::fmt::Arguments) {
        if self.failure.is_some() {
            return;
        }
        if let Err(error) = writeln!(self.out, "{line}") {
            error!("Couldn't write to the console: {error}");
            self.failure = Some(error);
        }
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn show_memory(&mut self, memory: &[Word]) {
        let words: Vec<String> = memory.iter().map(|word| word.bits()).collect();
        self.emit(format_args!("Memory: {}", words.join(" ")));
    }
    fn show_accumulator(&mut self, accumulator: Word) {
        self.emit(format_args!("AC: {accumulator}"));
    }
    fn report(&mut self, report: &Report) {
        self.emit(format_args!("{report}"));
    }
    fn report_error(&mut self, error: &MachineError) {
        self.emit(format_args!("Error: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accu12::{Machine, RunOutcome};

    fn run_session(script: &str) -> (Machine, RunOutcome, String, String) {
        let mut prompts = Vec::new();
        let mut output = Vec::new();
        let mut machine = Machine::new();
        let outcome = {
            let mut input = StdinSource::new(script.as_bytes(), &mut prompts, false);
            let mut renderer = ConsoleRenderer::new(&mut output);
            let outcome = machine.run(&mut input, &mut renderer);
            input.finish().unwrap();
            renderer.finish().unwrap();
            outcome
        };
        (
            machine,
            outcome,
            String::from_utf8(prompts).unwrap(),
            String::from_utf8(output).unwrap(),
        )
    }

    #[test]
    fn session_prompts_and_renders() {
        let (machine, outcome, prompts, output) =
            run_session("0011\n000\n00011\r\n1001\n0000\n");
        assert_eq!(outcome, RunOutcome::Halted);
        assert_eq!(machine.memory()[0].value(), 4);
        assert!(prompts.starts_with(
            "Enter the opcode (4 bits): Enter the address (3 bits): Enter the operand (5 bits): "
        ));
        assert_eq!(
            output,
            "Memory: 00100 00010 00000 00000 00000 00000 00000 00000\n\
             Largest value in memory: 4, smallest value in memory: 0\n\
             Shutting down...\n\
             Memory: 00100 00010 00000 00000 00000 00000 00000 00000\n"
        );
    }

    #[test]
    fn session_survives_bad_input_and_eof() {
        let (machine, outcome, _, output) = run_session("0102\n1010\n0\n0110\n");
        assert_eq!(outcome, RunOutcome::InputClosed);
        assert!(!machine.is_halted());
        assert_eq!(
            output,
            "Error: invalid opcode \"0102\": expected 4 binary digits\n\
             Error: invalid address \"0\": expected 3 binary digits\n\
             Error: invalid command 0110\n"
        );
    }

    #[test]
    fn renderer_prints_every_slot() {
        let mut output = Vec::new();
        let mut renderer = ConsoleRenderer::new(&mut output);
        let memory = [Word::MAX, Word::ZERO, Word::new(5).unwrap()];
        renderer.show_memory(&memory);
        renderer.show_accumulator(Word::MAX);
        renderer.finish().unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Memory: 11111 00000 00101\nAC: 11111\n"
        );
    }

    #[test]
    fn compare_prints_both_values() {
        let (_, _, prompts, output) = run_session("1000\n001\n000\n");
        assert!(prompts.contains("Enter the other address (3 bits): "));
        assert_eq!(
            output,
            "Memory[1] = 00010 and Memory[0] = 00001\n\
             Memory[1] is greater than Memory[0]\n"
        );
    }
}
