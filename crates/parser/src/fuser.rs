//! Immediate/operator fusion.
//!
//! A literal written directly before an immediate-consuming opcode becomes
//! one instruction. Sine, square root and bitwise not of a literal fold to
//! a constant. Two adjacent `v` become the reverse rotation.

use crate::lexer::{Lexeme, Token};
use ibniz_common::{word, Instruction, Opcode, Word};

/// Turn tokens into unresolved instructions.
pub(crate) fn fuse(tokens: &[Token]) -> Vec<Instruction> {
    let mut instructions = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let next = tokens.get(i + 1).filter(|next| token.touches(next));

        match (token.lexeme, next.map(|n| n.lexeme)) {
            (Lexeme::Literal(w), Some(Lexeme::Op(op))) if op.takes_immediate() => {
                instructions.push(fuse_literal(op, w));
                i += 2;
            }
            (Lexeme::Op(Opcode::TriRot), Some(Lexeme::Op(Opcode::TriRot))) => {
                instructions.push(Instruction::Op(Opcode::TriRotReverse));
                i += 2;
            }
            (Lexeme::Literal(w), _) => {
                instructions.push(Instruction::Imm(w));
                i += 1;
            }
            (Lexeme::Op(op), _) => {
                instructions.push(Instruction::Op(op));
                i += 1;
            }
        }
    }

    instructions
}

fn fuse_literal(op: Opcode, w: Word) -> Instruction {
    match op {
        Opcode::Sin => Instruction::Imm(word::sin(w)),
        Opcode::Sqrt => Instruction::Imm(word::sqrt(w)),
        Opcode::Not => Instruction::Imm(!w),
        _ => Instruction::ImmOp(op, w),
    }
}
