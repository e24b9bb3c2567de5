//! Main execution loop and opcode dispatch for the IPPcode22 VM.

use std::io::Write;

use ippcode_common::{Argument, Instruction, Opcode, Value};
use log::{debug, trace};

use crate::error::RuntimeError;
use crate::labels::LabelTable;
use crate::machine::{malformed, require_defined, site, VM};
use crate::ops::{self, ArithOp, CmpOp, Site};

/// What to do after an instruction completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Continue with the following instruction.
    Next,
    /// Continue at the given instruction index.
    Jump(usize),
    /// Stop with the given exit code.
    Exit(i32),
}

type Binary = fn(Site, &Value, &Value) -> Result<Value, RuntimeError>;
type Unary = fn(Site, &Value) -> Result<Value, RuntimeError>;

impl<'a> VM<'a> {
    /// Resolve labels, then run until the program ends or EXIT.
    ///
    /// Returns the exit code: 0 when execution runs off the end.
    pub fn execute(&mut self) -> Result<i32, RuntimeError> {
        self.labels = LabelTable::resolve(self.program)?;
        let program = self.program;

        while let Some(instr) = program.get(self.pc) {
            trace!("{:>4} {}", instr.order, instr);
            let step = self.step(instr)?;
            self.executed += 1;
            match step {
                Step::Next => self.pc += 1,
                Step::Jump(target) => self.pc = target,
                Step::Exit(code) => {
                    debug!("EXIT {code} after {} instructions", self.executed);
                    return Ok(code);
                }
            }
        }

        debug!("program finished after {} instructions", self.executed);
        Ok(0)
    }

    /// Execute one instruction.
    fn step(&mut self, instr: &'a Instruction) -> Result<Step, RuntimeError> {
        match instr.opcode {
            // Frames and calls
            Opcode::Move => self.exec_move(instr)?,
            Opcode::CreateFrame => self.frames.create_frame(),
            Opcode::PushFrame => self.frames.push_frame().map_err(|f| f.at(instr.order))?,
            Opcode::PopFrame => self.frames.pop_frame().map_err(|f| f.at(instr.order))?,
            Opcode::DefVar => self.exec_defvar(instr)?,
            Opcode::Call => return self.exec_call(instr),
            Opcode::Return => return self.exec_return(instr),

            // Operand stack
            Opcode::Pushs => {
                let value = self.defined(instr, 0)?;
                self.push(value);
            }
            Opcode::Pops => {
                let var = self.destination(instr, 0)?;
                let value = self.pop(instr)?;
                self.store(instr, var, value)?;
            }
            Opcode::Clears => self.data_stack.clear(),

            // Arithmetic, relational, boolean, conversion
            Opcode::Add => {
                self.exec_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::Add, a, b))?
            }
            Opcode::Sub => {
                self.exec_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::Sub, a, b))?
            }
            Opcode::Mul => {
                self.exec_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::Mul, a, b))?
            }
            Opcode::Div => {
                self.exec_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::Div, a, b))?
            }
            Opcode::IDiv => {
                self.exec_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::IDiv, a, b))?
            }
            Opcode::Lt => self.exec_binary(instr, |s, a, b| relation(s, CmpOp::Lt, a, b))?,
            Opcode::Gt => self.exec_binary(instr, |s, a, b| relation(s, CmpOp::Gt, a, b))?,
            Opcode::Eq => self.exec_binary(instr, |s, a, b| relation(s, CmpOp::Eq, a, b))?,
            Opcode::And => self.exec_binary(instr, |s, a, b| ops::logic(s, true, a, b))?,
            Opcode::Or => self.exec_binary(instr, |s, a, b| ops::logic(s, false, a, b))?,
            Opcode::Not => self.exec_unary(instr, ops::not)?,
            Opcode::Int2Char => self.exec_unary(instr, ops::int_to_char)?,
            Opcode::Stri2Int => self.exec_binary(instr, ops::string_to_int)?,
            Opcode::Int2Float => self.exec_unary(instr, ops::int_to_float)?,
            Opcode::Float2Int => self.exec_unary(instr, ops::float_to_int)?,

            // Input and output
            Opcode::Read => self.exec_read(instr)?,
            Opcode::Write => {
                let value = self.defined(instr, 0)?;
                emit(instr, &mut *self.streams.output, &value)?;
            }

            // Strings
            Opcode::Concat => self.exec_binary(instr, ops::concat)?,
            Opcode::Strlen => self.exec_unary(instr, ops::strlen)?,
            Opcode::GetChar => self.exec_binary(instr, ops::get_char)?,
            Opcode::SetChar => self.exec_setchar(instr)?,

            // Types
            Opcode::Type => {
                let var = self.destination(instr, 0)?;
                let value = self.symbol(instr, 1)?;
                self.store(instr, var, Value::from(value.type_name()))?;
            }

            // Control flow
            Opcode::Label => {}
            Opcode::Jump => return Ok(Step::Jump(self.label_target(instr)?)),
            Opcode::JumpIfEq => return self.exec_conditional_jump(instr, true),
            Opcode::JumpIfNeq => return self.exec_conditional_jump(instr, false),
            Opcode::Exit => {
                let value = self.defined(instr, 0)?;
                return Ok(Step::Exit(ops::exit_code(site(instr), &value)?));
            }

            // Debugging
            Opcode::DPrint => {
                let value = self.defined(instr, 0)?;
                emit(instr, &mut *self.streams.diagnostics, &value)?;
            }
            Opcode::Break => self.dump(),

            // Stack forms
            Opcode::Adds => {
                self.exec_stack_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::Add, a, b))?
            }
            Opcode::Subs => {
                self.exec_stack_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::Sub, a, b))?
            }
            Opcode::Muls => {
                self.exec_stack_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::Mul, a, b))?
            }
            Opcode::Divs => {
                self.exec_stack_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::Div, a, b))?
            }
            Opcode::IDivs => {
                self.exec_stack_binary(instr, |s, a, b| ops::arithmetic(s, ArithOp::IDiv, a, b))?
            }
            Opcode::Lts => self.exec_stack_binary(instr, |s, a, b| relation(s, CmpOp::Lt, a, b))?,
            Opcode::Gts => self.exec_stack_binary(instr, |s, a, b| relation(s, CmpOp::Gt, a, b))?,
            Opcode::Eqs => self.exec_stack_binary(instr, |s, a, b| relation(s, CmpOp::Eq, a, b))?,
            Opcode::Ands => self.exec_stack_binary(instr, |s, a, b| ops::logic(s, true, a, b))?,
            Opcode::Ors => self.exec_stack_binary(instr, |s, a, b| ops::logic(s, false, a, b))?,
            Opcode::Nots => self.exec_stack_unary(instr, ops::not)?,
            Opcode::Int2Chars => self.exec_stack_unary(instr, ops::int_to_char)?,
            Opcode::Stri2Ints => self.exec_stack_binary(instr, ops::string_to_int)?,
            Opcode::Int2Floats => self.exec_stack_unary(instr, ops::int_to_float)?,
            Opcode::Float2Ints => self.exec_stack_unary(instr, ops::float_to_int)?,
            Opcode::JumpIfEqs => return self.exec_stack_jump(instr, true),
            Opcode::JumpIfNeqs => return self.exec_stack_jump(instr, false),
        }
        Ok(Step::Next)
    }

    // ---- Frames and calls ----

    fn exec_move(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let var = self.destination(instr, 0)?;
        let value = self.defined(instr, 1)?;
        self.store(instr, var, value)
    }

    fn exec_defvar(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let Some(Argument::Var(var)) = instr.arg(0) else {
            return Err(malformed(instr, 0));
        };
        self.frames.define(var).map_err(|f| f.at(instr.order))
    }

    fn exec_call(&mut self, instr: &'a Instruction) -> Result<Step, RuntimeError> {
        let target = self.label_target(instr)?;
        self.call_stack.push(self.pc);
        Ok(Step::Jump(target))
    }

    fn exec_return(&mut self, instr: &'a Instruction) -> Result<Step, RuntimeError> {
        let saved = self
            .call_stack
            .pop()
            .ok_or(RuntimeError::EmptyCallStack { at: instr.order })?;
        Ok(Step::Jump(saved + 1))
    }

    // ---- Three-address forms ----

    /// `<var> <symb1> <symb2>`: destination, then operands, then the
    /// undefined check, then the operation itself.
    fn exec_binary(&mut self, instr: &'a Instruction, op: Binary) -> Result<(), RuntimeError> {
        let var = self.destination(instr, 0)?;
        let a = self.symbol(instr, 1)?;
        let b = self.symbol(instr, 2)?;
        let a = require_defined(instr, a)?;
        let b = require_defined(instr, b)?;
        let result = op(site(instr), &a, &b)?;
        self.store(instr, var, result)
    }

    /// `<var> <symb>`.
    fn exec_unary(&mut self, instr: &'a Instruction, op: Unary) -> Result<(), RuntimeError> {
        let var = self.destination(instr, 0)?;
        let a = self.defined(instr, 1)?;
        let result = op(site(instr), &a)?;
        self.store(instr, var, result)
    }

    fn exec_read(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let var = self.destination(instr, 0)?;
        let type_name = self.type_name(instr, 1)?;
        let line = self.streams.input.read_line();
        let value = ops::read_value(site(instr), type_name, line)?;
        self.store(instr, var, value)
    }

    /// SETCHAR modifies the string already stored in its destination.
    fn exec_setchar(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let var = self.destination(instr, 0)?;
        let target = self.symbol(instr, 0)?;
        let index = self.symbol(instr, 1)?;
        let replacement = self.symbol(instr, 2)?;
        let target = require_defined(instr, target)?;
        let index = require_defined(instr, index)?;
        let replacement = require_defined(instr, replacement)?;
        let result = ops::set_char(site(instr), &target, &index, &replacement)?;
        self.store(instr, var, result)
    }

    fn exec_conditional_jump(
        &mut self,
        instr: &'a Instruction,
        on_equal: bool,
    ) -> Result<Step, RuntimeError> {
        let target = self.label_target(instr)?;
        let a = self.defined(instr, 1)?;
        let b = self.defined(instr, 2)?;
        let equal = ops::values_equal(site(instr), &a, &b)?;
        Ok(if equal == on_equal {
            Step::Jump(target)
        } else {
            Step::Next
        })
    }

    // ---- Stack forms ----

    /// Pops the second operand, then the first.
    fn exec_stack_binary(
        &mut self,
        instr: &'a Instruction,
        op: Binary,
    ) -> Result<(), RuntimeError> {
        let b = self.pop(instr)?;
        let a = self.pop(instr)?;
        let result = op(site(instr), &a, &b)?;
        self.push(result);
        Ok(())
    }

    fn exec_stack_unary(&mut self, instr: &'a Instruction, op: Unary) -> Result<(), RuntimeError> {
        let a = self.pop(instr)?;
        let result = op(site(instr), &a)?;
        self.push(result);
        Ok(())
    }

    fn exec_stack_jump(
        &mut self,
        instr: &'a Instruction,
        on_equal: bool,
    ) -> Result<Step, RuntimeError> {
        let target = self.label_target(instr)?;
        let b = self.pop(instr)?;
        let a = self.pop(instr)?;
        let equal = ops::values_equal(site(instr), &a, &b)?;
        Ok(if equal == on_equal {
            Step::Jump(target)
        } else {
            Step::Next
        })
    }
}

fn relation(site: Site, op: CmpOp, a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    ops::compare(site, op, a, b).map(Value::Bool)
}

/// Write a value's text form and flush, so output interleaves correctly with
/// the diagnostic stream.
fn emit(instr: &Instruction, out: &mut dyn Write, value: &Value) -> Result<(), RuntimeError> {
    write!(out, "{value}")
        .and_then(|()| out.flush())
        .map_err(|err| RuntimeError::Output {
            at: instr.order,
            message: err.to_string(),
        })
}
