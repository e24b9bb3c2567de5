//! Program representation: the ordered instruction list handed to the VM.

use crate::instruction::Instruction;

/// An IPPcode22 program: instructions in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// The instruction stream, sorted by `order`.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a program, sorting the instructions by their `order` key.
    ///
    /// The sort is stable, so instructions sharing an order keep their
    /// relative position. Uniqueness of orders is the loader's concern.
    pub fn new(mut instructions: Vec<Instruction>) -> Self {
        instructions.sort_by_key(|instr| instr.order);
        Self { instructions }
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at execution index `pc`.
    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    #[test]
    fn empty_program() {
        let program = Program::new(vec![]);
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
        assert_eq!(program.get(0), None);
    }

    #[test]
    fn sorts_by_order() {
        let program = Program::new(vec![
            Instruction::new(Opcode::Return, 30, vec![]),
            Instruction::new(Opcode::CreateFrame, 2, vec![]),
            Instruction::new(Opcode::PushFrame, 10, vec![]),
        ]);
        let orders: Vec<usize> = program.instructions.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![2, 10, 30]);
        assert_eq!(program.get(1).unwrap().opcode, Opcode::PushFrame);
    }

    #[test]
    fn len_and_is_empty() {
        let program = Program::new(vec![
            Instruction::new(Opcode::Break, 1, vec![]),
            Instruction::new(Opcode::Clears, 2, vec![]),
        ]);
        assert_eq!(program.len(), 2);
        assert!(!program.is_empty());
    }
}
