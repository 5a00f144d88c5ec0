//! IBNIZ parser: source text -> resolved instruction stream.
//!
//! Parsing never fails. Characters that are neither literal digits nor
//! opcodes are skipped, and control markers without a partner are left
//! unresolved.
//!
//! # Usage
//!
//! ```
//! use ibniz_common::{Instruction, Opcode, ONE};
//! use ibniz_parser::{disassemble, parse};
//!
//! let program = parse("2* ?1:0;");
//! assert_eq!(program.instructions[0], Instruction::ImmOp(Opcode::Mul, 2 * ONE));
//! assert_eq!(program.instructions[1], Instruction::OpTarget(Opcode::If, 3));
//! assert_eq!(parse(&disassemble(&program)), program);
//! ```
//!
//! # Stages
//!
//! 1. The lexer splits text into literals and opcodes with character spans.
//! 2. The fuser folds touching literal/opcode pairs into one instruction.
//! 3. The resolver pairs control closers with their openers.

mod disassembler;
mod fuser;
mod lexer;
mod resolver;

pub use disassembler::{disassemble, listing};

use ibniz_common::Program;
use tracing::debug;

/// Parse source text into a resolved program.
pub fn parse(text: &str) -> Program {
    let tokens = lexer::tokenize(text);
    let mut instructions = fuser::fuse(&tokens);
    resolver::resolve(&mut instructions);
    debug!(
        tokens = tokens.len(),
        instructions = instructions.len(),
        "parsed program"
    );
    Program::new(instructions)
}
