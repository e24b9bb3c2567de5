//! Error types for the IPPcode22 XML loader.

use ippcode_common::{DecodeError, Opcode};
use thiserror::Error;

/// Whether a load error is a well-formedness or a structure problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadErrorKind {
    /// The input is not well-formed XML (31).
    Format,
    /// Well-formed XML that is not a valid program (32).
    Structure,
}

impl LoadErrorKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadErrorKind::Format => 31,
            LoadErrorKind::Structure => 32,
        }
    }
}

/// Errors produced while loading a program from XML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// XML syntax error.
    #[error("malformed XML: {message}")]
    Malformed { message: String },

    /// Root element is not `program`.
    #[error("unexpected root element '{name}', expected 'program'")]
    UnexpectedRoot { name: String },

    /// Missing or unsupported `language` attribute.
    #[error("unsupported language '{found}', expected 'IPPcode22'")]
    Language { found: String },

    /// Element other than `instruction` under the root, or other than
    /// `arg1`..`arg3` under an instruction.
    #[error("unexpected element '{name}' in '{parent}'")]
    UnexpectedElement { parent: String, name: String },

    /// Required attribute missing.
    #[error("element '{element}' is missing attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// `opcode` attribute does not name an instruction.
    #[error("unknown opcode '{name}'")]
    UnknownOpcode { name: String },

    /// `order` attribute is not a positive integer.
    #[error("invalid order '{value}'")]
    InvalidOrder { value: String },

    /// Two instructions share an order.
    #[error("duplicate order {order}")]
    DuplicateOrder { order: usize },

    /// The same `argN` element appears twice in one instruction.
    #[error("instruction {order}: duplicate argument '{name}'")]
    DuplicateArgument { order: usize, name: String },

    /// Arguments are not numbered `arg1`, `arg2`, ... without gaps.
    #[error("instruction {order}: arguments must be numbered consecutively from arg1")]
    ArgumentGap { order: usize },

    /// Wrong number of arguments for the opcode.
    #[error("instruction {order}: {opcode} expects {expected} argument(s), found {found}")]
    ArgumentCount {
        order: usize,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// Argument of the wrong kind for its slot.
    #[error("instruction {order}: argument {index} of {opcode} must be {expected}")]
    OperandKind {
        order: usize,
        opcode: Opcode,
        index: usize,
        expected: &'static str,
    },

    /// `type` attribute of an argument is not a known argument type.
    #[error("instruction {order}: unknown argument type '{name}'")]
    UnknownArgumentType { order: usize, name: String },

    /// Argument text does not match its declared type.
    #[error("instruction {order}: {source}")]
    InvalidLiteral {
        order: usize,
        #[source]
        source: DecodeError,
    },
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::Malformed { .. } => LoadErrorKind::Format,
            _ => LoadErrorKind::Structure,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

impl From<quick_xml::Error> for LoadError {
    fn from(err: quick_xml::Error) -> Self {
        LoadError::Malformed {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_missing_attribute() {
        let e = LoadError::MissingAttribute {
            element: "instruction",
            attribute: "order",
        };
        assert_eq!(e.to_string(), "element 'instruction' is missing attribute 'order'");
    }

    #[test]
    fn error_display_argument_count() {
        let e = LoadError::ArgumentCount {
            order: 4,
            opcode: Opcode::Move,
            expected: 2,
            found: 1,
        };
        assert_eq!(
            e.to_string(),
            "instruction 4: MOVE expects 2 argument(s), found 1"
        );
    }

    #[test]
    fn error_display_invalid_literal() {
        let e = LoadError::InvalidLiteral {
            order: 2,
            source: DecodeError::InvalidInt("x".to_string()),
        };
        assert_eq!(e.to_string(), "instruction 2: invalid int literal 'x'");
    }

    #[test]
    fn exit_codes() {
        let malformed = LoadError::Malformed {
            message: "eof".to_string(),
        };
        assert_eq!(malformed.exit_code(), 31);
        assert_eq!(LoadError::DuplicateOrder { order: 1 }.exit_code(), 32);
        assert_eq!(
            LoadError::Language {
                found: String::new()
            }
            .kind(),
            LoadErrorKind::Structure
        );
    }
}
