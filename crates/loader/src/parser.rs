//! Element tree → validated [`Program`].
//!
//! Checks the document structure (root, instruction and argument elements,
//! required attributes, unique orders), decodes every argument according to
//! its declared type and matches the arguments against the opcode's
//! signature.

use std::collections::HashSet;

use ippcode_common::literal::{decode_string, parse_hex_float, parse_int};
use ippcode_common::{is_identifier, Argument, DecodeError, Instruction, Opcode, Program, Value};
use log::debug;

use crate::error::LoadError;
use crate::reader::Element;

/// Value of the root's `language` attribute, compared case-insensitively.
pub const LANGUAGE: &str = "IPPcode22";

/// Argument slot element names, in slot order.
const ARG_NAMES: [&str; 3] = ["arg1", "arg2", "arg3"];

fn required<'e>(
    element: &'e Element,
    name: &'static str,
    attribute: &'static str,
) -> Result<&'e str, LoadError> {
    element
        .attribute(attribute)
        .ok_or(LoadError::MissingAttribute {
            element: name,
            attribute,
        })
}

/// Validate the root element and convert its instructions.
pub(crate) fn parse_program(root: &Element) -> Result<Program, LoadError> {
    if root.name != "program" {
        return Err(LoadError::UnexpectedRoot {
            name: root.name.clone(),
        });
    }
    let language = root.attribute("language").unwrap_or_default();
    if !language.eq_ignore_ascii_case(LANGUAGE) {
        return Err(LoadError::Language {
            found: language.to_string(),
        });
    }

    let mut orders = HashSet::new();
    let mut instructions = Vec::with_capacity(root.children.len());
    for child in &root.children {
        let instr = parse_instruction(child)?;
        if !orders.insert(instr.order) {
            return Err(LoadError::DuplicateOrder { order: instr.order });
        }
        instructions.push(instr);
    }

    debug!(
        "loaded {} instructions{}",
        instructions.len(),
        root.attribute("name")
            .map(|name| format!(" from program '{name}'"))
            .unwrap_or_default()
    );
    Ok(Program::new(instructions))
}

fn parse_instruction(element: &Element) -> Result<Instruction, LoadError> {
    if element.name != "instruction" {
        return Err(LoadError::UnexpectedElement {
            parent: "program".to_string(),
            name: element.name.clone(),
        });
    }

    let name = required(element, "instruction", "opcode")?;
    let opcode: Opcode = name.parse().map_err(|_| LoadError::UnknownOpcode {
        name: name.to_string(),
    })?;
    let order = parse_order(required(element, "instruction", "order")?)?;

    let slots = collect_slots(element, order)?;
    let signature = opcode.signature();
    if slots.len() != signature.len() {
        return Err(LoadError::ArgumentCount {
            order,
            opcode,
            expected: signature.len(),
            found: slots.len(),
        });
    }

    let mut args = Vec::with_capacity(slots.len());
    for (index, (slot, &kind)) in slots.into_iter().zip(signature).enumerate() {
        let arg = parse_argument(slot, order)?;
        if !arg.fits(kind) {
            return Err(LoadError::OperandKind {
                order,
                opcode,
                index: index + 1,
                expected: kind.name(),
            });
        }
        args.push(arg);
    }

    Ok(Instruction::new(opcode, order, args))
}

/// Positive decimal integer.
fn parse_order(text: &str) -> Result<usize, LoadError> {
    let invalid = || LoadError::InvalidOrder {
        value: text.to_string(),
    };
    let digits = text.trim();
    let digits = digits.strip_prefix('+').unwrap_or(digits);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match digits.parse::<usize>() {
        Ok(order) if order > 0 => Ok(order),
        _ => Err(invalid()),
    }
}

/// Argument elements in slot order. Elements may appear in any order but
/// must form a gapless `arg1..argN` sequence.
fn collect_slots(element: &Element, order: usize) -> Result<Vec<&Element>, LoadError> {
    let mut slots: [Option<&Element>; 3] = [None; 3];
    for child in &element.children {
        let index = ARG_NAMES
            .iter()
            .position(|name| *name == child.name)
            .ok_or_else(|| LoadError::UnexpectedElement {
                parent: "instruction".to_string(),
                name: child.name.clone(),
            })?;
        if slots[index].replace(child).is_some() {
            return Err(LoadError::DuplicateArgument {
                order,
                name: child.name.clone(),
            });
        }
    }

    let count = slots.iter().filter(|slot| slot.is_some()).count();
    if slots[..count].iter().any(Option::is_none) {
        return Err(LoadError::ArgumentGap { order });
    }
    Ok(slots.into_iter().flatten().collect())
}

fn parse_argument(element: &Element, order: usize) -> Result<Argument, LoadError> {
    let kind = required(element, "argument", "type")?;
    if !matches!(
        kind,
        "var" | "label" | "type" | "string" | "int" | "bool" | "float" | "nil"
    ) {
        return Err(LoadError::UnknownArgumentType {
            order,
            name: kind.to_string(),
        });
    }
    decode_argument(kind, &element.text)
        .map_err(|source| LoadError::InvalidLiteral { order, source })
}

/// Decode argument text according to its declared type.
pub(crate) fn decode_argument(kind: &str, text: &str) -> Result<Argument, DecodeError> {
    let literal = |value| Ok(Argument::Literal(value));
    match kind {
        "var" => text.parse().map(Argument::Var),
        "label" if is_identifier(text) => Ok(Argument::Label(text.to_string())),
        "label" => Err(DecodeError::InvalidIdentifier(text.to_string())),
        "type" if matches!(text, "int" | "bool" | "string" | "float") => {
            Ok(Argument::Type(text.to_string()))
        }
        "type" => Err(DecodeError::InvalidTypeName(text.to_string())),
        "string" => decode_string(text).map(Value::String).and_then(literal),
        "int" => parse_int(text)
            .map(Value::Int)
            .ok_or_else(|| DecodeError::InvalidInt(text.to_string()))
            .and_then(literal),
        "bool" => match text {
            "true" => literal(Value::Bool(true)),
            "false" => literal(Value::Bool(false)),
            _ => Err(DecodeError::InvalidBool(text.to_string())),
        },
        "nil" if text == "nil" => literal(Value::Nil),
        "nil" => Err(DecodeError::InvalidNil(text.to_string())),
        _ => parse_float_literal(text)
            .map(Value::Float)
            .ok_or_else(|| DecodeError::InvalidFloat(text.to_string()))
            .and_then(literal),
    }
}

/// Hexadecimal floating point, or decimal notation when that fails.
fn parse_float_literal(text: &str) -> Option<f64> {
    parse_hex_float(text).or_else(|| text.trim().parse().ok())
}
