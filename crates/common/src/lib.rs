//! IPPcode22 common types.
//!
//! This crate provides the data structures shared by the loader and the VM:
//!
//! - [`Opcode`] — the closed instruction set with operand signatures
//! - [`Value`] — runtime values stored in frames and on the operand stack
//! - [`Instruction`], [`Argument`], [`VarRef`] — decoded instructions
//! - [`Program`] — instructions sorted by order
//! - [`literal`] — string escape and hexadecimal float codecs
//! - [`DecodeError`] — errors from decoding operand text

pub mod error;
pub mod instruction;
pub mod literal;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use instruction::{is_identifier, Argument, FrameKind, Instruction, VarRef};
pub use opcode::{Opcode, OperandKind};
pub use program::Program;
pub use value::Value;

#[cfg(test)]
mod proptests {
    use super::literal::*;
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every string survives escaping, and the escaped form contains no
        /// whitespace or `#`.
        #[test]
        fn string_escape_roundtrip(s in "[ -~\\t\\n\u{a0}-\u{17f}]{0,40}") {
            let encoded = encode_string(&s);
            prop_assert!(!encoded.chars().any(|c| c.is_whitespace() || c == '#'));
            prop_assert_eq!(decode_string(&encoded).unwrap(), s);
        }

        /// Every finite float prints in a form that parses back to the same bits.
        #[test]
        fn hex_float_roundtrip(bits in any::<u64>()) {
            let x = f64::from_bits(bits);
            prop_assume!(x.is_finite());
            let text = format_hex_float(x);
            let parsed = parse_hex_float(&text).unwrap();
            prop_assert_eq!(parsed.to_bits(), x.to_bits());
        }

        /// Every integer parses back from its decimal rendering.
        #[test]
        fn int_roundtrip(n in any::<i64>()) {
            prop_assert_eq!(parse_int(&n.to_string()), Some(n));
        }

        /// Mnemonics parse regardless of case.
        #[test]
        fn opcode_case_insensitive(op in prop::sample::select(&opcode::ALL_OPCODES[..])) {
            prop_assert_eq!(op.mnemonic().to_lowercase().parse::<Opcode>().unwrap(), op);
        }
    }
}
