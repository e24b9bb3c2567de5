//! VM state: frames, stacks, labels, program counter and streams.

use ippcode_common::{Argument, Instruction, Program, Value, VarRef};

use crate::error::RuntimeError;
use crate::frame::FrameContext;
use crate::io::Streams;
use crate::labels::LabelTable;
use crate::ops::Site;
use crate::stack::{CallStack, OperandStack};

/// The IPPcode22 virtual machine.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Label targets, filled in before the first instruction runs.
    pub(crate) labels: LabelTable,
    pub(crate) frames: FrameContext,
    /// Operand stack for PUSHS, POPS and the stack instruction forms.
    pub(crate) data_stack: OperandStack,
    /// Program counters saved by CALL.
    pub(crate) call_stack: CallStack,
    /// Index of the instruction being executed.
    pub(crate) pc: usize,
    /// Instructions completed so far.
    pub(crate) executed: u64,
    pub(crate) streams: Streams<'a>,
}

impl<'a> VM<'a> {
    /// Create a new VM for the given program.
    pub fn new(program: &'a Program, streams: Streams<'a>) -> Self {
        Self {
            program,
            labels: LabelTable::default(),
            frames: FrameContext::new(),
            data_stack: OperandStack::new(),
            call_stack: CallStack::new(),
            pc: 0,
            executed: 0,
            streams,
        }
    }

    pub fn frames(&self) -> &FrameContext {
        &self.frames
    }

    pub fn data_stack(&self) -> &OperandStack {
        &self.data_stack
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Argument in slot `index`, or an internal error if it is missing.
    fn arg(&self, instr: &'a Instruction, index: usize) -> Result<&'a Argument, RuntimeError> {
        instr.arg(index).ok_or_else(|| malformed(instr, index))
    }

    /// Destination variable in slot `index`. The variable must exist.
    pub(crate) fn destination(
        &self,
        instr: &'a Instruction,
        index: usize,
    ) -> Result<&'a VarRef, RuntimeError> {
        match self.arg(instr, index)? {
            Argument::Var(var) => {
                self.frames.get(var).map_err(|fault| fault.at(instr.order))?;
                Ok(var)
            }
            _ => Err(malformed(instr, index)),
        }
    }

    /// Value of the symbol in slot `index`. May be [`Value::Undefined`].
    pub(crate) fn symbol(
        &self,
        instr: &'a Instruction,
        index: usize,
    ) -> Result<Value, RuntimeError> {
        match self.arg(instr, index)? {
            Argument::Literal(value) => Ok(value.clone()),
            Argument::Var(var) => self
                .frames
                .get(var)
                .cloned()
                .map_err(|fault| fault.at(instr.order)),
            _ => Err(malformed(instr, index)),
        }
    }

    /// Value of the symbol in slot `index`, which must be initialized.
    pub(crate) fn defined(
        &self,
        instr: &'a Instruction,
        index: usize,
    ) -> Result<Value, RuntimeError> {
        let value = self.symbol(instr, index)?;
        require_defined(instr, value)
    }

    /// Name in a `type` slot.
    pub(crate) fn type_name(
        &self,
        instr: &'a Instruction,
        index: usize,
    ) -> Result<&'a str, RuntimeError> {
        match self.arg(instr, index)? {
            Argument::Type(name) => Ok(name),
            _ => Err(malformed(instr, index)),
        }
    }

    /// Jump target of the label in slot 0.
    pub(crate) fn label_target(&self, instr: &'a Instruction) -> Result<usize, RuntimeError> {
        let Argument::Label(label) = self.arg(instr, 0)? else {
            return Err(malformed(instr, 0));
        };
        self.labels
            .target(label)
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                at: instr.order,
                label: label.clone(),
            })
    }

    /// Assign to an existing variable.
    pub(crate) fn store(
        &mut self,
        instr: &Instruction,
        var: &VarRef,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let slot = self
            .frames
            .get_mut(var)
            .map_err(|fault| fault.at(instr.order))?;
        *slot = value;
        Ok(())
    }

    /// Push onto the operand stack.
    pub(crate) fn push(&mut self, value: Value) {
        self.data_stack.push(value);
    }

    /// Pop from the operand stack.
    pub(crate) fn pop(&mut self, instr: &Instruction) -> Result<Value, RuntimeError> {
        self.data_stack
            .pop()
            .ok_or(RuntimeError::EmptyOperandStack { at: instr.order })
    }
}

pub(crate) fn site(instr: &Instruction) -> Site {
    Site {
        at: instr.order,
        opcode: instr.opcode,
    }
}

/// Reject [`Value::Undefined`].
pub(crate) fn require_defined(instr: &Instruction, value: Value) -> Result<Value, RuntimeError> {
    if value.is_undefined() {
        Err(RuntimeError::MissingValue { at: instr.order })
    } else {
        Ok(value)
    }
}

pub(crate) fn malformed(instr: &Instruction, index: usize) -> RuntimeError {
    RuntimeError::MalformedOperand {
        at: instr.order,
        opcode: instr.opcode,
        index,
    }
}
