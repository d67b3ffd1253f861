//! A tiny accumulator machine: eight five bit words of memory, one
//! accumulator, and twelve bit instructions typed in as binary text.

mod bits;
pub use bits::*;
mod error;
pub use error::MachineError;
mod io;
pub use io::*;
mod machine;
pub use machine::*;
