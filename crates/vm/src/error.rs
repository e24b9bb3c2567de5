//! Runtime errors for the IPPcode22 VM.
//!
//! Every error carries the `order` of the instruction that raised it (`at`).
//! Errors are grouped into [`ErrorKind`]s, each of which maps to a fixed
//! process exit code.

use ippcode_common::{FrameKind, Opcode};
use thiserror::Error;

/// Error categories and their exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Label misuse or variable redefinition (52).
    Semantic,
    /// Operand of the wrong type (53).
    WrongType,
    /// Access to a variable that was never defined (54).
    UndefinedVariable,
    /// LF or TF used while the frame does not exist (55).
    NonexistentFrame,
    /// Read of an uninitialized variable or an empty stack (56).
    MissingValue,
    /// Operand of the right type but an invalid value (57).
    WrongValue,
    /// Bad string index or codepoint (58).
    StringHandling,
    /// Anything else (99).
    Internal,
}

impl ErrorKind {
    /// Process exit code for this category.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Semantic => 52,
            ErrorKind::WrongType => 53,
            ErrorKind::UndefinedVariable => 54,
            ErrorKind::NonexistentFrame => 55,
            ErrorKind::MissingValue => 56,
            ErrorKind::WrongValue => 57,
            ErrorKind::StringHandling => 58,
            ErrorKind::Internal => 99,
        }
    }
}

/// Errors that occur during label resolution or program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The same label is defined by two LABEL instructions.
    #[error("label '{label}' redefined at instruction {at}")]
    DuplicateLabel { at: usize, label: String },

    /// A jump or call names a label no LABEL defines.
    #[error("undefined label '{label}' at instruction {at}")]
    UndefinedLabel { at: usize, label: String },

    /// DEFVAR of a name that already exists in the frame.
    #[error("variable {name} redefined at instruction {at}")]
    VariableRedefinition { at: usize, name: String },

    /// Operand types do not suit the instruction.
    #[error("wrong operand types for {opcode} at instruction {at}")]
    TypeMismatch { at: usize, opcode: Opcode },

    /// Variable not defined in an existing frame.
    #[error("undefined variable {name} at instruction {at}")]
    UndefinedVariable { at: usize, name: String },

    /// LF with an empty frame stack, or TF before CREATEFRAME.
    #[error("frame {frame} does not exist at instruction {at}")]
    NonexistentFrame { at: usize, frame: FrameKind },

    /// Read of a variable that has not been assigned.
    #[error("missing value at instruction {at}")]
    MissingValue { at: usize },

    /// Pop from an empty operand stack.
    #[error("operand stack is empty at instruction {at}")]
    EmptyOperandStack { at: usize },

    /// RETURN without a matching CALL.
    #[error("call stack is empty at instruction {at}")]
    EmptyCallStack { at: usize },

    /// DIV or IDIV by zero.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// EXIT with a code outside 0..=49.
    #[error("exit code {code} out of range 0-49 at instruction {at}")]
    ExitCodeOutOfRange { at: usize, code: i64 },

    /// READ with a type it cannot read.
    #[error("cannot read values of type '{name}' at instruction {at}")]
    UnsupportedReadType { at: usize, name: String },

    /// FLOAT2INT of NaN, an infinity, or a value outside the int range.
    #[error("float not representable as int at instruction {at}")]
    FloatToIntOverflow { at: usize },

    /// String index outside the string.
    #[error("index {index} out of range (length {length}) at instruction {at}")]
    IndexOutOfRange { at: usize, index: i64, length: usize },

    /// INT2CHAR of a value that is not a Unicode scalar value.
    #[error("invalid codepoint {value} at instruction {at}")]
    InvalidCodepoint { at: usize, value: i64 },

    /// SETCHAR with an empty replacement string.
    #[error("empty replacement string at instruction {at}")]
    EmptyReplacement { at: usize },

    /// Operand slot missing or of the wrong kind. Loaded programs never
    /// trigger this; hand-built ones can.
    #[error("malformed operand {index} for {opcode} at instruction {at}")]
    MalformedOperand {
        at: usize,
        opcode: Opcode,
        index: usize,
    },

    /// Writing to an output stream failed.
    #[error("output failed at instruction {at}: {message}")]
    Output { at: usize, message: String },
}

impl RuntimeError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::DuplicateLabel { .. }
            | RuntimeError::UndefinedLabel { .. }
            | RuntimeError::VariableRedefinition { .. } => ErrorKind::Semantic,
            RuntimeError::TypeMismatch { .. } => ErrorKind::WrongType,
            RuntimeError::UndefinedVariable { .. } => ErrorKind::UndefinedVariable,
            RuntimeError::NonexistentFrame { .. } => ErrorKind::NonexistentFrame,
            RuntimeError::MissingValue { .. }
            | RuntimeError::EmptyOperandStack { .. }
            | RuntimeError::EmptyCallStack { .. } => ErrorKind::MissingValue,
            RuntimeError::DivisionByZero { .. }
            | RuntimeError::ExitCodeOutOfRange { .. }
            | RuntimeError::UnsupportedReadType { .. }
            | RuntimeError::FloatToIntOverflow { .. } => ErrorKind::WrongValue,
            RuntimeError::IndexOutOfRange { .. }
            | RuntimeError::InvalidCodepoint { .. }
            | RuntimeError::EmptyReplacement { .. } => ErrorKind::StringHandling,
            RuntimeError::MalformedOperand { .. } | RuntimeError::Output { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}
