//! Opcode definitions for the IPPcode22 instruction set.

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// Kind of operand an instruction slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// A variable reference (`GF@x`).
    Var,
    /// A variable reference or a literal constant.
    Symb,
    /// A label name.
    Label,
    /// A type name (`int`, `bool`, `string`, `float`).
    Type,
}

impl OperandKind {
    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            OperandKind::Var => "var",
            OperandKind::Symb => "symb",
            OperandKind::Label => "label",
            OperandKind::Type => "type",
        }
    }
}

use OperandKind::{Label, Symb, Type, Var};

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames and calls
    /// Copy a symbol into a variable.
    Move,
    /// Replace the temporary frame with a new empty one.
    CreateFrame,
    /// Move the temporary frame onto the frame stack.
    PushFrame,
    /// Move the top of the frame stack into the temporary slot.
    PopFrame,
    /// Define a new variable.
    DefVar,
    /// Save the program counter and jump to a label.
    Call,
    /// Resume after the most recent CALL.
    Return,

    // Operand stack
    /// Push a symbol onto the operand stack.
    Pushs,
    /// Pop the operand stack into a variable.
    Pops,
    /// Empty the operand stack.
    Clears,

    // Arithmetic, relational, boolean
    /// Sum of two ints or two floats.
    Add,
    /// Difference of two ints or two floats.
    Sub,
    /// Product of two ints or two floats.
    Mul,
    /// Real division of two floats.
    Div,
    /// Floor division of two ints or two floats.
    IDiv,
    /// Less-than of two same-typed, non-nil symbols.
    Lt,
    /// Greater-than of two same-typed, non-nil symbols.
    Gt,
    /// Equality of two same-typed symbols or nil.
    Eq,
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Boolean negation.
    Not,

    // Conversions
    /// Codepoint to single-character string.
    Int2Char,
    /// Codepoint of the character at an index.
    Stri2Int,
    /// Int to float.
    Int2Float,
    /// Float to int, truncating.
    Float2Int,

    // Input/output and strings
    /// Read one line of input as the given type.
    Read,
    /// Write a symbol to standard output.
    Write,
    /// Concatenate two strings.
    Concat,
    /// Length of a string in characters.
    Strlen,
    /// Single character at an index.
    GetChar,
    /// Replace a character of the variable's string.
    SetChar,
    /// Dynamic type name of a symbol.
    Type,

    // Control flow
    /// Jump target.
    Label,
    /// Unconditional jump.
    Jump,
    /// Jump if two symbols are equal.
    JumpIfEq,
    /// Jump if two symbols differ.
    JumpIfNeq,
    /// Terminate with an exit code in 0..=49.
    Exit,

    // Debugging
    /// Write a symbol to the diagnostic stream.
    DPrint,
    /// Dump interpreter state to the diagnostic stream.
    Break,

    // Stack variants
    /// ADD over the operand stack.
    Adds,
    /// SUB over the operand stack.
    Subs,
    /// MUL over the operand stack.
    Muls,
    /// DIV over the operand stack.
    Divs,
    /// IDIV over the operand stack.
    IDivs,
    /// LT over the operand stack.
    Lts,
    /// GT over the operand stack.
    Gts,
    /// EQ over the operand stack.
    Eqs,
    /// AND over the operand stack.
    Ands,
    /// OR over the operand stack.
    Ors,
    /// NOT over the operand stack.
    Nots,
    /// INT2CHAR over the operand stack.
    Int2Chars,
    /// STRI2INT over the operand stack.
    Stri2Ints,
    /// INT2FLOAT over the operand stack.
    Int2Floats,
    /// FLOAT2INT over the operand stack.
    Float2Ints,
    /// JUMPIFEQ over the operand stack.
    JumpIfEqs,
    /// JUMPIFNEQ over the operand stack.
    JumpIfNeqs,
}

/// All opcodes, in definition order.
pub const ALL_OPCODES: [Opcode; 56] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::Pushs,
    Opcode::Pops,
    Opcode::Clears,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::IDiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Int2Float,
    Opcode::Float2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::DPrint,
    Opcode::Break,
    Opcode::Adds,
    Opcode::Subs,
    Opcode::Muls,
    Opcode::Divs,
    Opcode::IDivs,
    Opcode::Lts,
    Opcode::Gts,
    Opcode::Eqs,
    Opcode::Ands,
    Opcode::Ors,
    Opcode::Nots,
    Opcode::Int2Chars,
    Opcode::Stri2Ints,
    Opcode::Int2Floats,
    Opcode::Float2Ints,
    Opcode::JumpIfEqs,
    Opcode::JumpIfNeqs,
];

impl Opcode {
    /// Returns the mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Pushs => "PUSHS",
            Opcode::Pops => "POPS",
            Opcode::Clears => "CLEARS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Int2Float => "INT2FLOAT",
            Opcode::Float2Int => "FLOAT2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
            Opcode::Adds => "ADDS",
            Opcode::Subs => "SUBS",
            Opcode::Muls => "MULS",
            Opcode::Divs => "DIVS",
            Opcode::IDivs => "IDIVS",
            Opcode::Lts => "LTS",
            Opcode::Gts => "GTS",
            Opcode::Eqs => "EQS",
            Opcode::Ands => "ANDS",
            Opcode::Ors => "ORS",
            Opcode::Nots => "NOTS",
            Opcode::Int2Chars => "INT2CHARS",
            Opcode::Stri2Ints => "STRI2INTS",
            Opcode::Int2Floats => "INT2FLOATS",
            Opcode::Float2Ints => "FLOAT2INTS",
            Opcode::JumpIfEqs => "JUMPIFEQS",
            Opcode::JumpIfNeqs => "JUMPIFNEQS",
        }
    }

    /// Operand kinds this opcode takes, in `arg1..arg3` order.
    pub fn signature(&self) -> &'static [OperandKind] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Clears
            | Opcode::Break
            | Opcode::Adds
            | Opcode::Subs
            | Opcode::Muls
            | Opcode::Divs
            | Opcode::IDivs
            | Opcode::Lts
            | Opcode::Gts
            | Opcode::Eqs
            | Opcode::Ands
            | Opcode::Ors
            | Opcode::Nots
            | Opcode::Int2Chars
            | Opcode::Stri2Ints
            | Opcode::Int2Floats
            | Opcode::Float2Ints => &[],

            Opcode::DefVar | Opcode::Pops => &[Var],

            Opcode::Call
            | Opcode::Label
            | Opcode::Jump
            | Opcode::JumpIfEqs
            | Opcode::JumpIfNeqs => &[Label],

            Opcode::Pushs | Opcode::Write | Opcode::Exit | Opcode::DPrint => &[Symb],

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::Int2Float
            | Opcode::Float2Int
            | Opcode::Strlen
            | Opcode::Type => &[Var, Symb],

            Opcode::Read => &[Var, Type],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[Var, Symb, Symb],

            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[Label, Symb, Symb],
        }
    }

    /// Returns true if any operand of this opcode names a jump target.
    ///
    /// LABEL itself defines a target and is not included.
    pub fn references_label(&self) -> bool {
        matches!(
            self,
            Opcode::Call
                | Opcode::Jump
                | Opcode::JumpIfEq
                | Opcode::JumpIfNeq
                | Opcode::JumpIfEqs
                | Opcode::JumpIfNeqs
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Mnemonics are matched case-insensitively.
impl FromStr for Opcode {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| DecodeError::UnknownOpcode(s.to_string()))
    }
}
