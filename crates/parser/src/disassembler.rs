//! Disassembler: program -> canonical source text and listings.

use ibniz_common::word::format_literal;
use ibniz_common::{Instruction, Program};
use std::fmt::Write;

/// Render a program as canonical source text.
///
/// Instructions are separated by single spaces, so only fused instructions
/// come out with a literal touching its opcode. The output parses back to
/// an identical program (`parse(&disassemble(&p)) == p` for every parsed `p`).
pub fn disassemble(program: &Program) -> String {
    let words: Vec<String> = program.instructions.iter().map(render).collect();
    words.join(" ")
}

fn render(instr: &Instruction) -> String {
    match *instr {
        Instruction::Imm(w) => format_literal(w),
        Instruction::Op(op) | Instruction::OpTarget(op, _) => op.symbol().to_string(),
        Instruction::ImmOp(op, w) | Instruction::ImmOpTarget(op, w, _) => {
            format!("{}{}", format_literal(w), op.symbol())
        }
    }
}

/// Render one line per instruction: address, mnemonic, literal operand and
/// resolved target.
///
/// ```text
/// 0000  TIMES        4         -> 0002
/// 0001  ADD          1
/// 0002  LOOP
/// ```
pub fn listing(program: &Program) -> String {
    let mut out = String::new();
    for (addr, instr) in program.instructions.iter().enumerate() {
        let mnemonic = instr.opcode().map_or("PUSH", |op| op.mnemonic());
        let operand = instr.immediate().map(format_literal).unwrap_or_default();
        let mut line = format!("{addr:04}  {mnemonic:<12} {operand:<9}");
        if let Some(target) = instr.target() {
            let _ = write!(line, " -> {target:04}");
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
