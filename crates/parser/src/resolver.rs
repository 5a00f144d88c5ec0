//! Control-flow resolution.
//!
//! One forward pass pairs every closer with the nearest pending opener and
//! rewrites the opener to carry the closer's address:
//!
//! ```text
//! ?  ->  :  or  ;       if skips past the else or the end
//! :  ->  ;              else jumps past the end
//! [  ->  ]
//! X  ->  L
//! {  ->  }              define skips past the body
//! ```
//!
//! Openers left without a closer keep their plain form and generate no
//! branch.

use ibniz_common::{Instruction, Opcode};
use tracing::trace;

/// Pending openers, one stack per construct.
#[derive(Default)]
struct Pending {
    /// Unmatched `?` and `:`.
    conditionals: Vec<usize>,
    /// Unmatched `[`.
    loops: Vec<usize>,
    /// Unmatched `X`.
    counted: Vec<usize>,
    /// Unmatched `{`.
    definitions: Vec<usize>,
}

/// Rewrite matched openers in place with their closer addresses.
pub(crate) fn resolve(instructions: &mut [Instruction]) {
    let mut pending = Pending::default();

    for addr in 0..instructions.len() {
        let Some(op) = instructions[addr].opcode() else {
            continue;
        };
        match op {
            Opcode::If => pending.conditionals.push(addr),
            Opcode::Begin => pending.loops.push(addr),
            Opcode::Times => pending.counted.push(addr),
            Opcode::Define => pending.definitions.push(addr),

            Opcode::Else => {
                let matched = pending
                    .conditionals
                    .iter()
                    .rposition(|&at| instructions[at].is(Opcode::If));
                match matched {
                    Some(pos) => {
                        let opener = pending.conditionals.remove(pos);
                        link(instructions, opener, addr);
                        pending.conditionals.push(addr);
                    }
                    None => trace!(at = addr, "else without pending if"),
                }
            }
            Opcode::EndIf => match pending.conditionals.pop() {
                Some(opener) => link(instructions, opener, addr),
                None => trace!(at = addr, "end of conditional without opener"),
            },
            Opcode::While => close(instructions, &mut pending.loops, addr, "]"),
            Opcode::Loop => close(instructions, &mut pending.counted, addr, "L"),
            Opcode::Return => close(instructions, &mut pending.definitions, addr, "}"),
            _ => {}
        }
    }

    let unmatched = pending
        .conditionals
        .iter()
        .chain(&pending.loops)
        .chain(&pending.counted)
        .chain(&pending.definitions);
    for &at in unmatched {
        trace!(at, "opener left unmatched");
    }
}

fn close(instructions: &mut [Instruction], stack: &mut Vec<usize>, addr: usize, closer: &str) {
    match stack.pop() {
        Some(opener) => link(instructions, opener, addr),
        None => trace!(at = addr, closer, "closer without opener"),
    }
}

fn link(instructions: &mut [Instruction], opener: usize, closer: usize) {
    instructions[opener] = instructions[opener].with_target(closer);
}
