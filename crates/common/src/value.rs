//! Runtime value representation for the IPPcode22 VM.
//!
//! Values live in frame variables and on the operand stack.

use std::fmt;

use crate::literal::{encode_string, format_hex_float};

/// Runtime value representation.
#[derive(Debug, Clone)]
pub enum Value {
    /// State of a variable after DEFVAR and before its first assignment.
    /// Never produced by a literal and never stored by an instruction.
    Undefined,
    /// The single `nil` value.
    Nil,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// IEEE 754 64-bit float.
    Float(f64),
    /// Unicode string.
    String(String),
}

// Floats compare bitwise so that Value can implement Eq. Language-level
// equality (EQ, JUMPIFEQ) uses numeric comparison in the VM instead.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Type name as reported by TYPE. Empty for [`Value::Undefined`].
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "",
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Render as `type@literal`, the way the value would be written in
    /// source. Used by debug dumps.
    pub fn describe(&self) -> String {
        match self {
            Value::Undefined => "<undefined>".to_string(),
            Value::Nil => "nil@nil".to_string(),
            Value::String(s) => format!("string@{}", encode_string(s)),
            other => format!("{}@{}", other.type_name(), other),
        }
    }
}

/// The text form written by WRITE and DPRINT: `nil` prints as nothing,
/// bools as `true`/`false`, floats in hexadecimal notation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined | Value::Nil => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_hex_float(*x)),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(Value::Undefined.type_name(), "");
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Float(1.0).type_name(), "float");
        assert_eq!(Value::from("x").type_name(), "string");
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::Nil.to_string(), "");
        assert_eq!(Value::Undefined.to_string(), "");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Int(-12).to_string(), "-12");
        assert_eq!(Value::Float(3.0).to_string(), "0x1.8000000000000p+1");
        assert_eq!(Value::from("a b").to_string(), "a b");
    }

    #[test]
    fn describe_forms() {
        assert_eq!(Value::Nil.describe(), "nil@nil");
        assert_eq!(Value::Int(5).describe(), "int@5");
        assert_eq!(Value::Bool(true).describe(), "bool@true");
        assert_eq!(Value::from("a b").describe(), "string@a\\032b");
        assert_eq!(Value::Undefined.describe(), "<undefined>");
    }

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn different_variants_are_unequal() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Nil, Value::Undefined);
        assert_ne!(Value::from(""), Value::Nil);
    }
}
