//! Instructions and their operands.
//!
//! An instruction is an opcode, the `order` it was given in the source and
//! up to three already-decoded arguments. Variable operands are split into
//! frame and name at load time so the VM never reparses text.

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::literal::encode_string;
use crate::opcode::{Opcode, OperandKind};
use crate::value::Value;

/// Which frame a variable lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Global,
    Local,
    Temporary,
}

impl FrameKind {
    /// Source prefix: `GF`, `LF` or `TF`.
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for FrameKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GF" => Ok(FrameKind::Global),
            "LF" => Ok(FrameKind::Local),
            "TF" => Ok(FrameKind::Temporary),
            _ => Err(DecodeError::UnknownFrame(s.to_string())),
        }
    }
}

/// True if `name` is a valid variable or label identifier: a letter or one
/// of `_-$&%*!?` followed by letters, digits or those same characters.
pub fn is_identifier(name: &str) -> bool {
    const SPECIAL: &[char] = &['_', '-', '$', '&', '%', '*', '!', '?'];
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || SPECIAL.contains(&c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || SPECIAL.contains(&c))
}

/// A variable reference such as `LF@counter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub frame: FrameKind,
    pub name: String,
}

impl VarRef {
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

impl FromStr for VarRef {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, name) = s
            .split_once('@')
            .ok_or_else(|| DecodeError::UnknownFrame(s.to_string()))?;
        let frame = prefix
            .parse::<FrameKind>()
            .map_err(|_| DecodeError::UnknownFrame(s.to_string()))?;
        if !is_identifier(name) {
            return Err(DecodeError::InvalidIdentifier(s.to_string()));
        }
        Ok(VarRef::new(frame, name))
    }
}

/// A decoded instruction argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Var(VarRef),
    /// A constant. Never [`Value::Undefined`].
    Literal(Value),
    Label(String),
    /// One of `int`, `bool`, `string`, `float`.
    Type(String),
}

impl Argument {
    /// Whether this argument may fill a slot of the given kind.
    pub fn fits(&self, kind: OperandKind) -> bool {
        matches!(
            (self, kind),
            (Argument::Var(_), OperandKind::Var | OperandKind::Symb)
                | (Argument::Literal(_), OperandKind::Symb)
                | (Argument::Label(_), OperandKind::Label)
                | (Argument::Type(_), OperandKind::Type)
        )
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Var(var) => write!(f, "{var}"),
            Argument::Literal(Value::String(s)) => write!(f, "string@{}", encode_string(s)),
            Argument::Literal(value) => f.write_str(&value.describe()),
            Argument::Label(name) | Argument::Type(name) => f.write_str(name),
        }
    }
}

/// A single IPPcode22 instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Position key from the source. Unique and positive within a program.
    pub order: usize,
    /// Operands in slot order.
    pub args: Vec<Argument>,
}

impl Instruction {
    pub fn new(opcode: Opcode, order: usize, args: Vec<Argument>) -> Self {
        Self {
            opcode,
            order,
            args,
        }
    }

    /// Argument in slot `index` (0-based).
    pub fn arg(&self, index: usize) -> Option<&Argument> {
        self.args.get(index)
    }

    /// Label operand of a LABEL or jump instruction, if any.
    pub fn label(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            Argument::Label(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_kind_parse_and_display() {
        for kind in [FrameKind::Global, FrameKind::Local, FrameKind::Temporary] {
            assert_eq!(kind.to_string().parse::<FrameKind>().unwrap(), kind);
        }
        assert!("gf".parse::<FrameKind>().is_err());
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("x"));
        assert!(is_identifier("_tmp1"));
        assert!(is_identifier("$a&b%c*d!e?f-g"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier("a@b"));
    }

    #[test]
    fn var_ref_parse() {
        let var: VarRef = "LF@counter".parse().unwrap();
        assert_eq!(var, VarRef::new(FrameKind::Local, "counter"));
        assert_eq!(var.to_string(), "LF@counter");
    }

    #[test]
    fn var_ref_rejects_bad_prefix() {
        assert_eq!(
            "XF@a".parse::<VarRef>(),
            Err(DecodeError::UnknownFrame("XF@a".to_string()))
        );
        assert_eq!(
            "counter".parse::<VarRef>(),
            Err(DecodeError::UnknownFrame("counter".to_string()))
        );
    }

    #[test]
    fn var_ref_rejects_bad_name() {
        assert_eq!(
            "GF@9lives".parse::<VarRef>(),
            Err(DecodeError::InvalidIdentifier("GF@9lives".to_string()))
        );
    }

    #[test]
    fn argument_fits_kinds() {
        let var = Argument::Var(VarRef::new(FrameKind::Global, "x"));
        let lit = Argument::Literal(Value::Int(1));
        let label = Argument::Label("end".to_string());
        let ty = Argument::Type("int".to_string());

        assert!(var.fits(OperandKind::Var));
        assert!(var.fits(OperandKind::Symb));
        assert!(!lit.fits(OperandKind::Var));
        assert!(lit.fits(OperandKind::Symb));
        assert!(label.fits(OperandKind::Label));
        assert!(!label.fits(OperandKind::Symb));
        assert!(ty.fits(OperandKind::Type));
        assert!(!ty.fits(OperandKind::Label));
    }

    #[test]
    fn instruction_display() {
        let instr = Instruction::new(
            Opcode::Add,
            3,
            vec![
                Argument::Var(VarRef::new(FrameKind::Global, "x")),
                Argument::Literal(Value::Int(1)),
                Argument::Literal(Value::from("a b")),
            ],
        );
        assert_eq!(instr.to_string(), "ADD GF@x int@1 string@a\\032b");
    }

    #[test]
    fn instruction_label() {
        let jump = Instruction::new(
            Opcode::JumpIfEq,
            1,
            vec![
                Argument::Label("loop".to_string()),
                Argument::Literal(Value::Nil),
                Argument::Literal(Value::Nil),
            ],
        );
        assert_eq!(jump.label(), Some("loop"));
        assert_eq!(Instruction::new(Opcode::Return, 2, vec![]).label(), None);
    }
}
