//! The operand stack (PUSHS / POPS and the stack instruction forms) and the
//! call stack of saved program counters.

use ippcode_common::Value;

/// LIFO stack of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperandStack {
    values: Vec<Value>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    /// CLEARS.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}

/// Program counters saved by CALL, most recent last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    returns: Vec<usize>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pc: usize) {
        self.returns.push(pc);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.returns.pop()
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}
