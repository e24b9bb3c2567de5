//! IPPcode22 loader: XML program representation → [`Program`].
//!
//! Loading happens in two passes. The reader checks that the input is
//! well-formed XML and builds an element tree (errors have exit code 31);
//! the parser validates the tree against the program format and decodes
//! every argument (exit code 32).
//!
//! # Usage
//!
//! ```
//! use ippcode_common::Opcode;
//! use ippcode_loader::load;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <program language="IPPcode22">
//!   <instruction order="1" opcode="WRITE">
//!     <arg1 type="string">hello\032world</arg1>
//!   </instruction>
//! </program>"#;
//!
//! let program = load(xml).unwrap();
//! assert_eq!(program.len(), 1);
//! assert_eq!(program.instructions[0].opcode, Opcode::Write);
//! ```

pub mod error;

mod parser;
mod reader;

pub use error::{LoadError, LoadErrorKind};
pub use parser::LANGUAGE;

use ippcode_common::Program;

/// Load a program from its XML representation.
///
/// Instructions are returned sorted by their `order` attribute. Returns the
/// first error encountered.
pub fn load(text: &str) -> Result<Program, LoadError> {
    let root = reader::read_document(text)?;
    parser::parse_program(&root)
}
