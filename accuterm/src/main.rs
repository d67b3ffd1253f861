use accu12::{Machine, RunOutcome};
use anyhow::bail;
use log::*;

mod console;
use console::{ConsoleRenderer, StdinSource};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let our_arguments: Vec<String> = std::env::args().skip(1).collect();
    debug!("our_arguments: {:?}", our_arguments);
    let echo = match our_arguments.as_slice() {
        [] => false,
        [flag] if flag == "--echo" => true,
        _ => {
            error!("Usage: accuterm [--echo]");
            bail!("unexpected arguments: {our_arguments:?}");
        }
    };

    let stdin = std::io::stdin();
    let mut input = StdinSource::new(stdin.lock(), std::io::stdout(), echo);
    let mut renderer = ConsoleRenderer::new(std::io::stdout());
    let mut machine = Machine::new();

    match machine.run(&mut input, &mut renderer) {
        RunOutcome::Halted => info!("Machine halted: {machine:?}"),
        RunOutcome::InputClosed => info!("Input closed before HALT: {machine:?}"),
    }
    input.finish()?;
    renderer.finish()
}
