//! Variable frames and the frame lifecycle (CREATEFRAME / PUSHFRAME /
//! POPFRAME).
//!
//! The global frame always exists. The temporary frame exists between
//! CREATEFRAME and the following PUSHFRAME; pushing moves it onto the frame
//! stack, whose top is the local frame. POPFRAME moves the local frame back
//! into the temporary slot, replacing whatever was there.

use indexmap::IndexMap;
use ippcode_common::{FrameKind, Value, VarRef};
use log::debug;

use crate::error::RuntimeError;

/// A set of variables, kept in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    vars: IndexMap<String, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name` as [`Value::Undefined`]. Returns false if it already
    /// exists.
    pub fn define(&mut self, name: &str) -> bool {
        if self.vars.contains_key(name) {
            return false;
        }
        self.vars.insert(name.to_string(), Value::Undefined);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.vars.get_mut(name)
    }

    /// Variables in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Why a frame operation failed. Converted to a [`RuntimeError`] once the
/// failing instruction is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameFault {
    NonexistentFrame(FrameKind),
    UndefinedVariable(VarRef),
    Redefinition(VarRef),
}

impl FrameFault {
    /// Attach the order of the failing instruction.
    pub fn at(self, at: usize) -> RuntimeError {
        match self {
            FrameFault::NonexistentFrame(frame) => RuntimeError::NonexistentFrame { at, frame },
            FrameFault::UndefinedVariable(var) => RuntimeError::UndefinedVariable {
                at,
                name: var.to_string(),
            },
            FrameFault::Redefinition(var) => RuntimeError::VariableRedefinition {
                at,
                name: var.to_string(),
            },
        }
    }
}

/// All frames visible to a running program.
#[derive(Debug, Default)]
pub struct FrameContext {
    global: Frame,
    temporary: Option<Frame>,
    stack: Vec<Frame>,
}

impl FrameContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// CREATEFRAME: replace the temporary frame with an empty one.
    pub fn create_frame(&mut self) {
        if self.temporary.is_some() {
            debug!("discarding previous temporary frame");
        }
        self.temporary = Some(Frame::new());
    }

    /// PUSHFRAME: move the temporary frame onto the frame stack.
    pub fn push_frame(&mut self) -> Result<(), FrameFault> {
        let frame = self
            .temporary
            .take()
            .ok_or(FrameFault::NonexistentFrame(FrameKind::Temporary))?;
        self.stack.push(frame);
        debug!("pushed frame, depth {}", self.stack.len());
        Ok(())
    }

    /// POPFRAME: move the local frame into the temporary slot.
    pub fn pop_frame(&mut self) -> Result<(), FrameFault> {
        let frame = self
            .stack
            .pop()
            .ok_or(FrameFault::NonexistentFrame(FrameKind::Local))?;
        self.temporary = Some(frame);
        debug!("popped frame, depth {}", self.stack.len());
        Ok(())
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    /// Top of the frame stack, if any.
    pub fn local(&self) -> Option<&Frame> {
        self.stack.last()
    }

    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// Number of frames on the frame stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame, FrameFault> {
        match kind {
            FrameKind::Global => Some(&self.global),
            FrameKind::Local => self.stack.last(),
            FrameKind::Temporary => self.temporary.as_ref(),
        }
        .ok_or(FrameFault::NonexistentFrame(kind))
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, FrameFault> {
        match kind {
            FrameKind::Global => Some(&mut self.global),
            FrameKind::Local => self.stack.last_mut(),
            FrameKind::Temporary => self.temporary.as_mut(),
        }
        .ok_or(FrameFault::NonexistentFrame(kind))
    }

    /// DEFVAR: add `var` to its frame as [`Value::Undefined`].
    pub fn define(&mut self, var: &VarRef) -> Result<(), FrameFault> {
        if self.frame_mut(var.frame)?.define(&var.name) {
            Ok(())
        } else {
            Err(FrameFault::Redefinition(var.clone()))
        }
    }

    /// Current value of `var`. May be [`Value::Undefined`].
    pub fn get(&self, var: &VarRef) -> Result<&Value, FrameFault> {
        self.frame(var.frame)?
            .get(&var.name)
            .ok_or_else(|| FrameFault::UndefinedVariable(var.clone()))
    }

    pub fn get_mut(&mut self, var: &VarRef) -> Result<&mut Value, FrameFault> {
        self.frame_mut(var.frame)?
            .get_mut(&var.name)
            .ok_or_else(|| FrameFault::UndefinedVariable(var.clone()))
    }
}
