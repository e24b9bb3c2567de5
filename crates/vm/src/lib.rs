//! IPPcode22 virtual machine: executes loaded instruction lists.
//!
//! The VM holds:
//! - a global frame, an optional temporary frame and a stack of local frames
//! - an operand stack for the stack instruction forms
//! - a call stack of saved program counters
//! - a label table resolved before execution starts
//!
//! # Usage
//!
//! ```
//! use std::io::{self, Cursor};
//! use ippcode_common::{Argument, Instruction, Opcode, Program, Value};
//! use ippcode_vm::{run, LineInput, Streams};
//!
//! let program = Program::new(vec![Instruction::new(
//!     Opcode::Write,
//!     1,
//!     vec![Argument::Literal(Value::from("hi"))],
//! )]);
//!
//! let mut input = LineInput::new(Cursor::new(""));
//! let mut output = Vec::new();
//! let mut diagnostics = io::sink();
//! let streams = Streams {
//!     input: &mut input,
//!     output: &mut output,
//!     diagnostics: &mut diagnostics,
//! };
//!
//! assert_eq!(run(&program, streams), Ok(0));
//! assert_eq!(output, b"hi");
//! ```

pub mod dump;
pub mod error;
pub mod execute;
pub mod frame;
pub mod io;
pub mod labels;
pub mod machine;
pub(crate) mod ops;
pub mod stack;

pub use error::{ErrorKind, RuntimeError};
pub use frame::{Frame, FrameContext};
pub use io::{InputSource, LineInput, Streams};
pub use labels::LabelTable;
pub use machine::VM;
pub use stack::{CallStack, OperandStack};

use ippcode_common::Program;

/// Execute a program and return its exit code.
///
/// Labels are resolved first; then instructions run from the first one
/// until the end of the program (exit code 0) or an EXIT instruction.
///
/// # Errors
///
/// Returns [`RuntimeError`] for the first fault; its
/// [`exit_code`](RuntimeError::exit_code) is the process exit code.
pub fn run<'a>(program: &'a Program, streams: Streams<'a>) -> Result<i32, RuntimeError> {
    let mut vm = VM::new(program, streams);
    vm.execute()
}
