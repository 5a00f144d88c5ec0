//! Parsed IBNIZ instructions.
//!
//! One [`Instruction`] occupies one program address. The parser produces
//! the plain forms; control-flow resolution rewrites matched openers into
//! the `*Target` forms carrying the closer's address.

use crate::opcode::Opcode;
use crate::word::Word;

/// A single instruction at one program address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// A bare opcode.
    Op(Opcode),
    /// Push a Q16.16 literal.
    Imm(Word),
    /// An opcode with a fused literal operand.
    ImmOp(Opcode, Word),
    /// A resolved control opener and the address of its closer.
    OpTarget(Opcode, usize),
    /// A resolved control opener with a fused literal operand.
    ImmOpTarget(Opcode, Word, usize),
}

impl Instruction {
    /// The opcode, or `None` for a plain literal push.
    pub fn opcode(&self) -> Option<Opcode> {
        match *self {
            Instruction::Op(op)
            | Instruction::ImmOp(op, _)
            | Instruction::OpTarget(op, _)
            | Instruction::ImmOpTarget(op, _, _) => Some(op),
            Instruction::Imm(_) => None,
        }
    }

    /// The literal operand, if any.
    pub fn immediate(&self) -> Option<Word> {
        match *self {
            Instruction::Imm(w) | Instruction::ImmOp(_, w) | Instruction::ImmOpTarget(_, w, _) => {
                Some(w)
            }
            Instruction::Op(_) | Instruction::OpTarget(_, _) => None,
        }
    }

    /// The resolved closer address, if this is a matched opener.
    pub fn target(&self) -> Option<usize> {
        match *self {
            Instruction::OpTarget(_, t) | Instruction::ImmOpTarget(_, _, t) => Some(t),
            _ => None,
        }
    }

    /// Returns true if this instruction carries `op`.
    pub fn is(&self, op: Opcode) -> bool {
        self.opcode() == Some(op)
    }

    /// Attach a resolved target, keeping any fused literal.
    ///
    /// A plain literal cannot carry a target and is returned unchanged.
    pub fn with_target(self, target: usize) -> Self {
        match self {
            Instruction::Op(op) | Instruction::OpTarget(op, _) => {
                Instruction::OpTarget(op, target)
            }
            Instruction::ImmOp(op, w) | Instruction::ImmOpTarget(op, w, _) => {
                Instruction::ImmOpTarget(op, w, target)
            }
            Instruction::Imm(_) => self,
        }
    }
}
