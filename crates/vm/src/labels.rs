//! Label resolution, done once before execution starts.

use std::collections::HashMap;

use ippcode_common::{Opcode, Program};
use log::debug;

use crate::error::RuntimeError;

/// Maps each label to the index of the instruction following its LABEL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    targets: HashMap<String, usize>,
}

impl LabelTable {
    /// Scan the program for LABEL instructions.
    ///
    /// A label defined twice fails as soon as the second definition is
    /// seen. References from jumps and calls are checked after the whole
    /// program has been scanned, so forward jumps resolve.
    pub fn resolve(program: &Program) -> Result<Self, RuntimeError> {
        let mut targets = HashMap::new();
        let mut references = Vec::new();

        for (index, instr) in program.instructions.iter().enumerate() {
            let Some(label) = instr.label() else {
                continue;
            };
            if instr.opcode == Opcode::Label {
                if targets.insert(label.to_string(), index + 1).is_some() {
                    return Err(RuntimeError::DuplicateLabel {
                        at: instr.order,
                        label: label.to_string(),
                    });
                }
            } else if instr.opcode.references_label() {
                references.push((instr.order, label));
            }
        }

        if let Some((at, label)) = references
            .into_iter()
            .find(|(_, label)| !targets.contains_key(*label))
        {
            return Err(RuntimeError::UndefinedLabel {
                at,
                label: label.to_string(),
            });
        }

        debug!("resolved {} labels", targets.len());
        Ok(Self { targets })
    }

    /// Index to continue at after jumping to `label`.
    pub fn target(&self, label: &str) -> Option<usize> {
        self.targets.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
