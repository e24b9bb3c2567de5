//! Instruction semantics on already-resolved values.
//!
//! These functions are shared by the three-address forms (operands from
//! frames and literals) and the stack forms (operands from the operand
//! stack). Callers have already rejected [`Value::Undefined`].

use ippcode_common::literal::{parse_hex_float, parse_int};
use ippcode_common::{Opcode, Value};

use crate::error::RuntimeError;

/// The instruction being executed, for error reporting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Site {
    pub at: usize,
    pub opcode: Opcode,
}

impl Site {
    pub fn mismatch(&self) -> RuntimeError {
        RuntimeError::TypeMismatch {
            at: self.at,
            opcode: self.opcode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Lt,
    Gt,
    Eq,
}

// ---- Arithmetic ----

/// ADD, SUB, MUL, IDIV on two ints or two floats; DIV on two floats.
pub(crate) fn arithmetic(
    site: Site,
    op: ArithOp,
    a: &Value,
    b: &Value,
) -> Result<Value, RuntimeError> {
    let zero = RuntimeError::DivisionByZero { at: site.at };
    match (a, b) {
        (&Value::Int(x), &Value::Int(y)) => Ok(Value::Int(match op {
            ArithOp::Add => x.wrapping_add(y),
            ArithOp::Sub => x.wrapping_sub(y),
            ArithOp::Mul => x.wrapping_mul(y),
            ArithOp::IDiv if y == 0 => return Err(zero),
            ArithOp::IDiv => floor_div(x, y),
            ArithOp::Div => return Err(site.mismatch()),
        })),
        (&Value::Float(x), &Value::Float(y)) => Ok(Value::Float(match op {
            ArithOp::Add => x + y,
            ArithOp::Sub => x - y,
            ArithOp::Mul => x * y,
            ArithOp::Div | ArithOp::IDiv if y == 0.0 => return Err(zero),
            ArithOp::Div => x / y,
            ArithOp::IDiv => floor_div_float(x, y),
        })),
        _ => Err(site.mismatch()),
    }
}

/// Integer division rounding toward negative infinity. `y` is non-zero.
fn floor_div(x: i64, y: i64) -> i64 {
    let quotient = x.wrapping_div(y);
    if x.wrapping_rem(y) != 0 && ((x < 0) != (y < 0)) {
        quotient.wrapping_sub(1)
    } else {
        quotient
    }
}

/// Float division rounding toward negative infinity. `y` is non-zero.
fn floor_div_float(x: f64, y: f64) -> f64 {
    let rem = x % y;
    let mut div = (x - rem) / y;
    if rem != 0.0 && ((y < 0.0) != (rem < 0.0)) {
        div -= 1.0;
    }
    if div == 0.0 {
        return 0.0f64.copysign(x / y);
    }
    let floored = div.floor();
    if div - floored > 0.5 {
        floored + 1.0
    } else {
        floored
    }
}

// ---- Comparison and logic ----

/// EQ / JUMPIFEQ equality. `nil` equals only `nil` and may be compared with
/// anything; otherwise both operands must have the same type.
pub(crate) fn values_equal(site: Site, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    match (a, b) {
        (Value::Nil, other) | (other, Value::Nil) => Ok(matches!(other, Value::Nil)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::Int(x), Value::Int(y)) => Ok(x == y),
        (Value::Float(x), Value::Float(y)) => Ok(x == y),
        (Value::String(x), Value::String(y)) => Ok(x == y),
        _ => Err(site.mismatch()),
    }
}

/// LT, GT, EQ. Ordering needs two operands of the same type other than
/// `nil`; `false < true` and strings compare by codepoint.
pub(crate) fn compare(
    site: Site,
    op: CmpOp,
    a: &Value,
    b: &Value,
) -> Result<bool, RuntimeError> {
    use std::cmp::Ordering;

    if op == CmpOp::Eq {
        return values_equal(site, a, b);
    }

    let ordering = match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => return Err(site.mismatch()),
    };

    Ok(match op {
        CmpOp::Lt => ordering == Some(Ordering::Less),
        CmpOp::Gt => ordering == Some(Ordering::Greater),
        CmpOp::Eq => ordering == Some(Ordering::Equal),
    })
}

/// AND (`conjunction`) or OR on two bools.
pub(crate) fn logic(
    site: Site,
    conjunction: bool,
    a: &Value,
    b: &Value,
) -> Result<Value, RuntimeError> {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(if conjunction {
            *x && *y
        } else {
            *x || *y
        })),
        _ => Err(site.mismatch()),
    }
}

pub(crate) fn not(site: Site, a: &Value) -> Result<Value, RuntimeError> {
    match a {
        Value::Bool(x) => Ok(Value::Bool(!x)),
        _ => Err(site.mismatch()),
    }
}

// ---- Conversions ----

pub(crate) fn int_to_char(site: Site, a: &Value) -> Result<Value, RuntimeError> {
    match a {
        Value::Int(n) => u32::try_from(*n)
            .ok()
            .and_then(char::from_u32)
            .map(|c| Value::String(c.to_string()))
            .ok_or(RuntimeError::InvalidCodepoint {
                at: site.at,
                value: *n,
            }),
        _ => Err(site.mismatch()),
    }
}

/// Character at `index` counted in Unicode scalar values.
fn char_at(site: Site, s: &str, index: i64) -> Result<char, RuntimeError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .ok_or_else(|| RuntimeError::IndexOutOfRange {
            at: site.at,
            index,
            length: s.chars().count(),
        })
}

pub(crate) fn string_to_int(site: Site, s: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match (s, index) {
        (Value::String(s), Value::Int(i)) => Ok(Value::Int(char_at(site, s, *i)? as i64)),
        _ => Err(site.mismatch()),
    }
}

pub(crate) fn int_to_float(site: Site, a: &Value) -> Result<Value, RuntimeError> {
    match a {
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        _ => Err(site.mismatch()),
    }
}

/// Truncate toward zero. NaN, infinities and values outside the int range
/// are rejected.
pub(crate) fn float_to_int(site: Site, a: &Value) -> Result<Value, RuntimeError> {
    // 2^63; every f64 below it in magnitude truncates into range.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    match a {
        Value::Float(x) => {
            let truncated = x.trunc();
            if truncated.is_finite() && truncated >= -LIMIT && truncated < LIMIT {
                Ok(Value::Int(truncated as i64))
            } else {
                Err(RuntimeError::FloatToIntOverflow { at: site.at })
            }
        }
        _ => Err(site.mismatch()),
    }
}

// ---- Strings ----

pub(crate) fn concat(site: Site, a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Ok(Value::String(format!("{x}{y}"))),
        _ => Err(site.mismatch()),
    }
}

pub(crate) fn strlen(site: Site, a: &Value) -> Result<Value, RuntimeError> {
    match a {
        Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
        _ => Err(site.mismatch()),
    }
}

pub(crate) fn get_char(site: Site, s: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match (s, index) {
        (Value::String(s), Value::Int(i)) => Ok(Value::String(char_at(site, s, *i)?.to_string())),
        _ => Err(site.mismatch()),
    }
}

/// Replace the character of `target` at `index` with the first character of
/// `replacement`.
pub(crate) fn set_char(
    site: Site,
    target: &Value,
    index: &Value,
    replacement: &Value,
) -> Result<Value, RuntimeError> {
    let (Value::String(target), Value::Int(index), Value::String(replacement)) =
        (target, index, replacement)
    else {
        return Err(site.mismatch());
    };

    char_at(site, target, *index)?;
    let Some(new_char) = replacement.chars().next() else {
        return Err(RuntimeError::EmptyReplacement { at: site.at });
    };

    let position = *index as usize;
    Ok(Value::String(
        target
            .chars()
            .enumerate()
            .map(|(i, c)| if i == position { new_char } else { c })
            .collect(),
    ))
}

// ---- Input and control ----

/// Convert a line read by READ into a value of type `type_name`.
///
/// End of input and unparsable lines both yield `nil`.
pub(crate) fn read_value(
    site: Site,
    type_name: &str,
    line: Option<String>,
) -> Result<Value, RuntimeError> {
    if !matches!(type_name, "int" | "bool" | "string" | "float") {
        return Err(RuntimeError::UnsupportedReadType {
            at: site.at,
            name: type_name.to_string(),
        });
    }
    let Some(line) = line else {
        return Ok(Value::Nil);
    };

    let value = match type_name {
        "string" => Some(Value::String(line)),
        "bool" => Some(Value::Bool(line.eq_ignore_ascii_case("true"))),
        "int" => parse_int(line.trim()).map(Value::Int),
        _ => parse_read_float(&line).map(Value::Float),
    };
    Ok(value.unwrap_or(Value::Nil))
}

/// Hexadecimal notation first, decimal when that fails.
fn parse_read_float(text: &str) -> Option<f64> {
    parse_hex_float(text).or_else(|| text.trim().parse().ok())
}

/// Exit code requested by EXIT.
pub(crate) fn exit_code(site: Site, a: &Value) -> Result<i32, RuntimeError> {
    match a {
        Value::Int(n @ 0..=49) => Ok(*n as i32),
        Value::Int(n) => Err(RuntimeError::ExitCodeOutOfRange {
            at: site.at,
            code: *n,
        }),
        _ => Err(site.mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SITE: Site = Site {
        at: 1,
        opcode: Opcode::Add,
    };

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn int_arithmetic() {
        assert_eq!(
            arithmetic(SITE, ArithOp::Add, &Value::Int(2), &Value::Int(3)),
            Ok(Value::Int(5))
        );
        assert_eq!(
            arithmetic(SITE, ArithOp::Sub, &Value::Int(2), &Value::Int(3)),
            Ok(Value::Int(-1))
        );
        assert_eq!(
            arithmetic(SITE, ArithOp::Mul, &Value::Int(-4), &Value::Int(3)),
            Ok(Value::Int(-12))
        );
    }

    #[test]
    fn int_arithmetic_wraps() {
        assert_eq!(
            arithmetic(SITE, ArithOp::Add, &Value::Int(i64::MAX), &Value::Int(1)),
            Ok(Value::Int(i64::MIN))
        );
        assert_eq!(
            arithmetic(SITE, ArithOp::IDiv, &Value::Int(i64::MIN), &Value::Int(-1)),
            Ok(Value::Int(i64::MIN))
        );
    }

    #[test]
    fn idiv_floors() {
        let idiv = |x, y| arithmetic(SITE, ArithOp::IDiv, &Value::Int(x), &Value::Int(y));
        assert_eq!(idiv(7, 2), Ok(Value::Int(3)));
        assert_eq!(idiv(-7, 2), Ok(Value::Int(-4)));
        assert_eq!(idiv(7, -2), Ok(Value::Int(-4)));
        assert_eq!(idiv(-7, -2), Ok(Value::Int(3)));
        assert_eq!(idiv(-6, 2), Ok(Value::Int(-3)));
    }

    #[test]
    fn float_idiv_floors() {
        let idiv = |x, y| arithmetic(SITE, ArithOp::IDiv, &Value::Float(x), &Value::Float(y));
        assert_eq!(idiv(7.5, 2.0), Ok(Value::Float(3.0)));
        assert_eq!(idiv(-7.5, 2.0), Ok(Value::Float(-4.0)));
        assert_eq!(idiv(1.0, -4.0), Ok(Value::Float(-1.0)));
        assert_eq!(idiv(-1.0, 4.0), Ok(Value::Float(-1.0)));
        assert_eq!(idiv(1.0, 4.0), Ok(Value::Float(0.0)));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            arithmetic(SITE, ArithOp::IDiv, &Value::Int(1), &Value::Int(0)),
            Err(RuntimeError::DivisionByZero { at: 1 })
        );
        assert_eq!(
            arithmetic(SITE, ArithOp::Div, &Value::Float(1.0), &Value::Float(0.0)),
            Err(RuntimeError::DivisionByZero { at: 1 })
        );
        assert_eq!(
            arithmetic(SITE, ArithOp::IDiv, &Value::Float(1.0), &Value::Float(-0.0)),
            Err(RuntimeError::DivisionByZero { at: 1 })
        );
    }

    #[test]
    fn div_is_float_only() {
        assert_eq!(
            arithmetic(SITE, ArithOp::Div, &Value::Float(1.0), &Value::Float(4.0)),
            Ok(Value::Float(0.25))
        );
        assert_eq!(
            arithmetic(SITE, ArithOp::Div, &Value::Int(4), &Value::Int(2)),
            Err(SITE.mismatch())
        );
    }

    #[test]
    fn mixed_arithmetic_is_a_type_error() {
        let result = arithmetic(SITE, ArithOp::Add, &Value::Int(1), &Value::Float(1.0));
        assert_eq!(result.map_err(|e| e.exit_code()), Err(53));
        let result = arithmetic(SITE, ArithOp::Add, &s("a"), &s("b"));
        assert_eq!(result.map_err(|e| e.exit_code()), Err(53));
    }

    #[test]
    fn equality_rules() {
        assert_eq!(values_equal(SITE, &Value::Nil, &Value::Nil), Ok(true));
        assert_eq!(values_equal(SITE, &Value::Nil, &Value::Int(0)), Ok(false));
        assert_eq!(values_equal(SITE, &s("x"), &Value::Nil), Ok(false));
        assert_eq!(values_equal(SITE, &s("x"), &s("x")), Ok(true));
        assert_eq!(values_equal(SITE, &Value::Float(0.0), &Value::Float(-0.0)), Ok(true));
        assert!(values_equal(SITE, &Value::Int(1), &Value::Bool(true)).is_err());
    }

    #[test]
    fn ordering_rules() {
        assert_eq!(compare(SITE, CmpOp::Lt, &Value::Int(1), &Value::Int(2)), Ok(true));
        assert_eq!(compare(SITE, CmpOp::Gt, &Value::Int(1), &Value::Int(2)), Ok(false));
        assert_eq!(
            compare(SITE, CmpOp::Lt, &Value::Bool(false), &Value::Bool(true)),
            Ok(true)
        );
        assert_eq!(compare(SITE, CmpOp::Gt, &s("b"), &s("abc")), Ok(true));
        assert_eq!(
            compare(SITE, CmpOp::Lt, &Value::Float(f64::NAN), &Value::Float(1.0)),
            Ok(false)
        );
        assert!(compare(SITE, CmpOp::Lt, &Value::Nil, &Value::Nil).is_err());
        assert_eq!(compare(SITE, CmpOp::Eq, &Value::Nil, &Value::Nil), Ok(true));
    }

    #[test]
    fn boolean_logic() {
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert_eq!(logic(SITE, true, &t, &f), Ok(f.clone()));
        assert_eq!(logic(SITE, false, &t, &f), Ok(t.clone()));
        assert_eq!(not(SITE, &f), Ok(t));
        assert!(logic(SITE, true, &Value::Int(1), &f).is_err());
        assert!(not(SITE, &Value::Nil).is_err());
    }

    #[test]
    fn char_conversions() {
        assert_eq!(int_to_char(SITE, &Value::Int(65)), Ok(s("A")));
        assert_eq!(int_to_char(SITE, &Value::Int(0x17e)), Ok(s("ž")));
        for bad in [-1, 0xD800, 0x110000] {
            assert_eq!(
                int_to_char(SITE, &Value::Int(bad)),
                Err(RuntimeError::InvalidCodepoint { at: 1, value: bad })
            );
        }
        assert_eq!(string_to_int(SITE, &s("až"), &Value::Int(1)), Ok(Value::Int(0x17e)));
    }

    #[test]
    fn index_equal_to_length_is_out_of_range() {
        assert_eq!(
            string_to_int(SITE, &s("abc"), &Value::Int(3)),
            Err(RuntimeError::IndexOutOfRange {
                at: 1,
                index: 3,
                length: 3
            })
        );
        assert!(get_char(SITE, &s("abc"), &Value::Int(-1)).is_err());
    }

    #[test]
    fn float_conversions() {
        assert_eq!(int_to_float(SITE, &Value::Int(-3)), Ok(Value::Float(-3.0)));
        assert_eq!(float_to_int(SITE, &Value::Float(-3.9)), Ok(Value::Int(-3)));
        assert_eq!(float_to_int(SITE, &Value::Float(2.5)), Ok(Value::Int(2)));
        for bad in [f64::NAN, f64::INFINITY, 1e19, -1e19] {
            assert_eq!(
                float_to_int(SITE, &Value::Float(bad)),
                Err(RuntimeError::FloatToIntOverflow { at: 1 })
            );
        }
        assert_eq!(
            float_to_int(SITE, &Value::Float(-9_223_372_036_854_775_808.0)),
            Ok(Value::Int(i64::MIN))
        );
    }

    #[test]
    fn string_operations() {
        assert_eq!(concat(SITE, &s("ab"), &s("cd")), Ok(s("abcd")));
        assert_eq!(strlen(SITE, &s("žluť")), Ok(Value::Int(4)));
        assert_eq!(strlen(SITE, &s("")), Ok(Value::Int(0)));
        assert_eq!(get_char(SITE, &s("žluť"), &Value::Int(3)), Ok(s("ť")));
        assert!(concat(SITE, &s("a"), &Value::Nil).is_err());
    }

    #[test]
    fn set_char_replaces_one_character() {
        assert_eq!(
            set_char(SITE, &s("kolo"), &Value::Int(0), &s("pes")),
            Ok(s("polo"))
        );
        assert_eq!(
            set_char(SITE, &s("kolo"), &Value::Int(4), &s("x")).map_err(|e| e.exit_code()),
            Err(58)
        );
        assert_eq!(
            set_char(SITE, &s("kolo"), &Value::Int(1), &s("")),
            Err(RuntimeError::EmptyReplacement { at: 1 })
        );
        assert_eq!(
            set_char(SITE, &Value::Int(1), &Value::Int(0), &s("x")),
            Err(SITE.mismatch())
        );
    }

    #[test]
    fn read_conversions() {
        let line = |text: &str| Some(text.to_string());
        assert_eq!(read_value(SITE, "int", line(" 42 ")), Ok(Value::Int(42)));
        assert_eq!(read_value(SITE, "int", line("4x")), Ok(Value::Nil));
        assert_eq!(read_value(SITE, "bool", line("TRUE")), Ok(Value::Bool(true)));
        assert_eq!(read_value(SITE, "bool", line("yes")), Ok(Value::Bool(false)));
        assert_eq!(read_value(SITE, "bool", line(" true")), Ok(Value::Bool(false)));
        assert_eq!(read_value(SITE, "bool", line("true ")), Ok(Value::Bool(false)));
        assert_eq!(read_value(SITE, "string", line("a b")), Ok(s("a b")));
        assert_eq!(read_value(SITE, "float", line("0x1.8p+1")), Ok(Value::Float(3.0)));
        // Without a prefix the text is still read as hexadecimal: 1 + 5/16.
        assert_eq!(read_value(SITE, "float", line("1.5")), Ok(Value::Float(1.3125)));
        assert_eq!(read_value(SITE, "float", line("2.5e-1")), Ok(Value::Float(0.25)));
        assert_eq!(read_value(SITE, "float", line("1.8p0")), Ok(Value::Float(1.5)));
        assert_eq!(read_value(SITE, "float", line("abc?")), Ok(Value::Nil));
        assert_eq!(read_value(SITE, "string", None), Ok(Value::Nil));
    }

    #[test]
    fn read_unsupported_type() {
        assert_eq!(
            read_value(SITE, "nil", None),
            Err(RuntimeError::UnsupportedReadType {
                at: 1,
                name: "nil".to_string()
            })
        );
    }

    #[test]
    fn exit_code_range() {
        assert_eq!(exit_code(SITE, &Value::Int(0)), Ok(0));
        assert_eq!(exit_code(SITE, &Value::Int(49)), Ok(49));
        assert_eq!(
            exit_code(SITE, &Value::Int(50)),
            Err(RuntimeError::ExitCodeOutOfRange { at: 1, code: 50 })
        );
        assert_eq!(exit_code(SITE, &Value::Int(-1)).map_err(|e| e.exit_code()), Err(57));
        assert_eq!(exit_code(SITE, &s("0")), Err(SITE.mismatch()));
    }

    proptest! {
        /// Floor division and the matching remainder reconstruct the dividend.
        #[test]
        fn floor_div_identity(x in -1_000_000i64..1_000_000, y in -1000i64..1000) {
            prop_assume!(y != 0);
            let q = floor_div(x, y);
            let r = x - q * y;
            prop_assert!(r == 0 || (r < 0) == (y < 0));
            prop_assert!(r.abs() < y.abs());
        }

        /// LT and GT never both hold, and EQ excludes both.
        #[test]
        fn ordering_is_consistent(x in any::<i64>(), y in any::<i64>()) {
            let (a, b) = (Value::Int(x), Value::Int(y));
            let lt = compare(SITE, CmpOp::Lt, &a, &b).unwrap();
            let gt = compare(SITE, CmpOp::Gt, &a, &b).unwrap();
            let eq = compare(SITE, CmpOp::Eq, &a, &b).unwrap();
            prop_assert_eq!(u8::from(lt) + u8::from(gt) + u8::from(eq), 1);
        }
    }
}
