//! Integration tests for the IBNIZ parser.

use ibniz_common::{Instruction, Opcode, Program, ONE};
use ibniz_parser::{disassemble, listing, parse};
use proptest::prelude::*;

// ============================================================
// Helpers
// ============================================================

fn op(op: Opcode) -> Instruction {
    Instruction::Op(op)
}

fn imm(w: i32) -> Instruction {
    Instruction::Imm(w)
}

// ============================================================
// Tolerant parsing
// ============================================================

#[test]
fn empty_source_is_empty_program() {
    assert!(parse("").is_empty());
    assert!(parse("   \n\t").is_empty());
}

#[test]
fn comments_and_noise_are_skipped() {
    assert_eq!(parse("# note\nr"), Program::new(vec![op(Opcode::Rotate)]));
}

#[test]
fn opcode_only_program() {
    let program = parse("^xp");
    assert_eq!(
        program.instructions,
        vec![op(Opcode::Xor), op(Opcode::Exchange), op(Opcode::Pop)]
    );
}

#[test]
fn fused_and_plain_forms_mix() {
    let program = parse("d3r 4*+");
    assert_eq!(
        program.instructions,
        vec![
            op(Opcode::Dup),
            Instruction::ImmOp(Opcode::Rotate, 3 * ONE),
            Instruction::ImmOp(Opcode::Mul, 4 * ONE),
            op(Opcode::Add),
        ]
    );
}

#[test]
fn literal_before_non_consumer_is_pushed() {
    assert_eq!(
        parse("5w").instructions,
        vec![imm(5 * ONE), op(Opcode::Where)]
    );
}

// ============================================================
// Control flow
// ============================================================

#[test]
fn subroutine_definition_and_call() {
    let program = parse("1{d*}2 1V");
    assert_eq!(
        program.instructions[0],
        Instruction::ImmOpTarget(Opcode::Define, ONE, 3)
    );
    assert_eq!(program.instructions[3], op(Opcode::Return));
    assert_eq!(program.instructions[5], Instruction::ImmOp(Opcode::Call, ONE));
}

#[test]
fn loop_inside_conditional() {
    let program = parse("?3X1+L:0;");
    assert_eq!(program.instructions[0], Instruction::OpTarget(Opcode::If, 4));
    assert_eq!(
        program.instructions[1],
        Instruction::ImmOpTarget(Opcode::Times, 3 * ONE, 3)
    );
    assert_eq!(program.instructions[4], Instruction::OpTarget(Opcode::Else, 6));
}

#[test]
fn every_resolved_target_points_at_its_closer() {
    let program = parse("[?{}:X L;]");
    for instr in &program.instructions {
        if let Some(target) = instr.target() {
            let closer = program.instructions[target].opcode().unwrap();
            let opener = instr.opcode().unwrap();
            let expected: &[Opcode] = match opener {
                Opcode::If => &[Opcode::Else, Opcode::EndIf],
                Opcode::Else => &[Opcode::EndIf],
                Opcode::Begin => &[Opcode::While],
                Opcode::Times => &[Opcode::Loop],
                Opcode::Define => &[Opcode::Return],
                other => panic!("unexpected opener {other:?}"),
            };
            assert!(expected.contains(&closer), "{opener:?} -> {closer:?}");
        }
    }
}

// ============================================================
// Disassembly
// ============================================================

#[test]
fn disassemble_canonicalizes() {
    let program = parse("  01.80* vv  ff");
    assert_eq!(disassemble(&program), "1.8* vv");
}

#[test]
fn disassemble_keeps_folded_constants() {
    let program = parse("4q 0~");
    assert_eq!(disassemble(&program), "2 FFFF.FFFF");
}

#[test]
fn listing_has_one_line_per_instruction() {
    let program = parse("?1:2;");
    let text = listing(&program);
    assert_eq!(text.lines().count(), 5);
    assert!(text.starts_with("0000  IF"));
    assert!(text.lines().next().unwrap().ends_with("-> 0002"));
}

// ============================================================
// Properties
// ============================================================

fn source_char() -> impl Strategy<Value = char> {
    prop::sample::select(
        "0123456789ABCDEF.+-*/%&|^~lrsqa<>=dpxv)(@!RPij[]XL?:;{}VJwMT #"
            .chars()
            .collect::<Vec<_>>(),
    )
}

proptest! {
    /// Disassembled text parses back to the same program.
    #[test]
    fn disassemble_reparses(chars in prop::collection::vec(source_char(), 0..60)) {
        let text: String = chars.into_iter().collect();
        let program = parse(&text);
        prop_assert_eq!(parse(&disassemble(&program)), program);
    }

    /// Parsing is deterministic.
    #[test]
    fn parse_is_deterministic(text in "\\PC{0,40}") {
        prop_assert_eq!(parse(&text), parse(&text));
    }

    /// Never more instructions than characters.
    #[test]
    fn at_most_one_instruction_per_char(text in "\\PC{0,40}") {
        prop_assert!(parse(&text).len() <= text.chars().count());
    }

    /// Every target lies after its opener and inside the program.
    #[test]
    fn targets_point_forward(chars in prop::collection::vec(source_char(), 0..60)) {
        let text: String = chars.into_iter().collect();
        let program = parse(&text);
        for (addr, instr) in program.instructions.iter().enumerate() {
            if let Some(target) = instr.target() {
                prop_assert!(target > addr);
                prop_assert!(target < program.len());
            }
        }
    }
}
