//! Decode errors for textual IPPcode22 operands.

use thiserror::Error;

/// Errors that occur while decoding an operand's text into a typed argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Mnemonic does not name an instruction.
    #[error("unknown opcode '{0}'")]
    UnknownOpcode(String),

    /// Variable name without a `GF@`, `LF@` or `TF@` prefix.
    #[error("unknown frame prefix in '{0}'")]
    UnknownFrame(String),

    /// Variable or label name that is not a valid identifier.
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// Type operand other than `int`, `bool`, `string` or `float`.
    #[error("invalid type name '{0}'")]
    InvalidTypeName(String),

    /// String literal containing whitespace, `#`, or a broken escape.
    #[error("invalid string literal '{0}'")]
    InvalidString(String),

    /// Integer literal that is not a signed decimal fitting in 64 bits.
    #[error("invalid int literal '{0}'")]
    InvalidInt(String),

    /// Float literal that is not valid hexadecimal floating point.
    #[error("invalid float literal '{0}'")]
    InvalidFloat(String),

    /// Bool literal other than `true` or `false`.
    #[error("invalid bool literal '{0}'")]
    InvalidBool(String),

    /// Nil literal other than `nil`.
    #[error("invalid nil literal '{0}'")]
    InvalidNil(String),
}
