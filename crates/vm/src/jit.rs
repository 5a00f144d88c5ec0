//! Basic-block compiler.
//!
//! The instruction stream is cut after every instruction whose successor is
//! not simply the next address: a conditional, a loop closer, a call, a
//! jump, a return, a media switch, a termination, a resolved else, or a
//! resolved subroutine definition. Each block is lowered once into
//! straight-line [`Op`]s ending in an [`Exit`].
//!
//! Every address maps to a (block, offset) entry, so a dynamic jump into
//! the middle of a block runs that block's tail. Code size is linear in the
//! program length.

use crate::memory::{Addressing, ADDRESS_MASK};
use ibniz_common::{rol16, word, Instruction, Opcode, Program, Word};
use tracing::debug;

/// Two-operand arithmetic, applied as `second OP top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shift,
    Rotate,
    Atan2,
}

/// One-operand arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnOp {
    Sin,
    Sqrt,
    Not,
    ClampNeg,
    ClampPos,
    IsZero,
}

/// A straight-line operation. Never transfers control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Push(Word),
    PushTwice(Word),
    Binary(BinOp),
    /// Fused literal as the top operand.
    BinaryImm(BinOp, Word),
    Unary(UnOp),

    Dup,
    Drop,
    Exchange,
    TriRot,
    TriRotReverse,
    Pick,
    PickAt(i64),
    Bury,
    BuryAt(i64),

    Load,
    /// Fixed address through the stack windows.
    LoadAt(usize),
    /// Fixed address in general memory.
    LoadDirect(usize),
    Store,
    StoreAt(usize),
    StoreDirect(usize),

    FromControl,
    ToControl,
    ToControlImm(Word),
    /// Push the control word `n` below the top.
    ControlPeek(i64),

    /// `[`: push the loop marker.
    Mark(Word),
    /// `X`: move the counter to the control stack, then push the marker.
    MarkCounted(Word),
    MarkCountedImm { count: Word, marker: Word },

    /// `{`: store the entry address at a popped slot.
    Define { entry: Word },
    DefineAt { slot: usize, entry: Word },

    Where,
}

/// How a block hands control back to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exit {
    /// Static successor.
    Goto(usize),
    /// `?`: pop; zero continues at `skip_to`, otherwise at `next`.
    IfZero { skip_to: usize, next: usize },
    /// `]`: pop; nonzero loops to the marker.
    While { next: usize },
    /// `L`: decrement the counter; nonzero loops to the marker.
    CountDown { next: usize },
    /// `}`: jump to the popped control word.
    Return,
    /// `V`: push the return address, jump through a memory slot.
    Call { ret: Word, slot: Option<usize> },
    /// `J`: jump to the popped word.
    Jump,
    /// Fused `J`.
    JumpTo(Word),
    /// `M`: end the video pass.
    Switch { at: usize, resume: usize },
    /// `T`.
    Terminate { at: usize },
}

/// A lowered basic block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
    /// Straight-line body.
    pub ops: Vec<Op>,
    /// Control transfer at the end of the body.
    pub exit: Exit,
}

/// A compiled program: blocks plus the per-address entry table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compiled {
    /// Blocks in program order.
    pub(crate) blocks: Vec<Block>,
    /// `entries[addr] = (block, offset)`.
    pub(crate) entries: Vec<(usize, usize)>,
}

impl Compiled {
    /// Number of program addresses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true for the empty program.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of basic blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total lowered operations across all blocks.
    pub fn op_count(&self) -> usize {
        self.blocks.iter().map(|b| b.ops.len()).sum()
    }
}

/// Compile a resolved program for the given addressing mode.
pub fn compile(program: &Program, addressing: Addressing) -> Compiled {
    let mut blocks = Vec::new();
    let mut entries = Vec::with_capacity(program.len());
    let mut ops = Vec::new();

    for (addr, instr) in program.instructions.iter().enumerate() {
        entries.push((blocks.len(), ops.len()));
        let (op, exit) = lower(addr, instr, addressing);
        ops.extend(op);
        if let Some(exit) = exit {
            blocks.push(Block {
                ops: std::mem::take(&mut ops),
                exit,
            });
        }
    }

    let open_block = entries.last().is_some_and(|&(block, _)| block == blocks.len());
    if open_block {
        blocks.push(Block {
            ops,
            exit: Exit::Goto(program.len()),
        });
    }

    debug!(
        instructions = program.len(),
        blocks = blocks.len(),
        "compiled program"
    );
    Compiled { blocks, entries }
}

/// Address a literal names: integer part, masked to 20 bits.
fn literal_address(w: Word) -> usize {
    rol16(w) as u32 as usize & ADDRESS_MASK
}

/// Lower one instruction into at most one op and, for block ends, an exit.
fn lower(addr: usize, instr: &Instruction, addressing: Addressing) -> (Option<Op>, Option<Exit>) {
    let next = addr + 1;
    let here = rol16(next as Word);

    let Some(opcode) = instr.opcode() else {
        return match instr.immediate() {
            Some(w) => (Some(Op::Push(w)), None),
            None => (None, None),
        };
    };
    let imm = instr.immediate();
    let target = instr.target();

    let op = match (opcode, imm) {
        (Opcode::Add, None) => Op::Binary(BinOp::Add),
        (Opcode::Sub, None) => Op::Binary(BinOp::Sub),
        (Opcode::Mul, None) => Op::Binary(BinOp::Mul),
        (Opcode::Div, None) => Op::Binary(BinOp::Div),
        (Opcode::Mod, None) => Op::Binary(BinOp::Mod),
        (Opcode::And, None) => Op::Binary(BinOp::And),
        (Opcode::Or, None) => Op::Binary(BinOp::Or),
        (Opcode::Xor, None) => Op::Binary(BinOp::Xor),
        (Opcode::Shift, None) => Op::Binary(BinOp::Shift),
        (Opcode::Rotate, None) => Op::Binary(BinOp::Rotate),
        (Opcode::Atan2, None) => Op::Binary(BinOp::Atan2),

        (Opcode::Add, Some(w)) => Op::BinaryImm(BinOp::Add, w),
        (Opcode::Sub, Some(w)) => Op::BinaryImm(BinOp::Sub, w),
        (Opcode::Mul, Some(w)) => Op::BinaryImm(BinOp::Mul, w),
        (Opcode::Div, Some(w)) => Op::BinaryImm(BinOp::Div, w),
        (Opcode::Mod, Some(w)) => Op::BinaryImm(BinOp::Mod, w),
        (Opcode::And, Some(w)) => Op::BinaryImm(BinOp::And, w),
        (Opcode::Or, Some(w)) => Op::BinaryImm(BinOp::Or, w),
        (Opcode::Xor, Some(w)) => Op::BinaryImm(BinOp::Xor, w),
        (Opcode::Shift, Some(w)) => Op::BinaryImm(BinOp::Shift, w),
        (Opcode::Rotate, Some(w)) => Op::BinaryImm(BinOp::Rotate, w),
        (Opcode::Atan2, Some(w)) => Op::BinaryImm(BinOp::Atan2, w),

        // Folded by the parser when written directly after a literal.
        (Opcode::Sin, Some(w)) => Op::Push(word::sin(w)),
        (Opcode::Sqrt, Some(w)) => Op::Push(word::sqrt(w)),
        (Opcode::Not, Some(w)) => Op::Push(!w),
        (Opcode::Sin, None) => Op::Unary(UnOp::Sin),
        (Opcode::Sqrt, None) => Op::Unary(UnOp::Sqrt),
        (Opcode::Not, None) => Op::Unary(UnOp::Not),
        (Opcode::ClampNeg, _) => Op::Unary(UnOp::ClampNeg),
        (Opcode::ClampPos, _) => Op::Unary(UnOp::ClampPos),
        (Opcode::IsZero, _) => Op::Unary(UnOp::IsZero),

        (Opcode::Dup, None) => Op::Dup,
        (Opcode::Dup, Some(w)) => Op::PushTwice(w),
        (Opcode::Pop, None) => Op::Drop,
        (Opcode::Pop, Some(_)) => return (None, None),
        (Opcode::Exchange, _) => Op::Exchange,
        (Opcode::TriRot, _) => Op::TriRot,
        (Opcode::TriRotReverse, _) => Op::TriRotReverse,
        (Opcode::Pick, None) => Op::Pick,
        (Opcode::Pick, Some(w)) => Op::PickAt(rol16(w) as i64),
        (Opcode::Bury, None) => Op::Bury,
        (Opcode::Bury, Some(w)) => Op::BuryAt(rol16(w) as i64),

        (Opcode::Load, None) => Op::Load,
        (Opcode::Load, Some(w)) => {
            let at = literal_address(w);
            if addressing.is_direct(at) {
                Op::LoadDirect(at)
            } else {
                Op::LoadAt(at)
            }
        }
        (Opcode::Store, None) => Op::Store,
        (Opcode::Store, Some(w)) => {
            let at = literal_address(w);
            if addressing.is_direct(at) {
                Op::StoreDirect(at)
            } else {
                Op::StoreAt(at)
            }
        }

        (Opcode::FromControl, _) => Op::FromControl,
        (Opcode::ToControl, None) => Op::ToControl,
        (Opcode::ToControl, Some(w)) => Op::ToControlImm(w),
        (Opcode::Index, _) => Op::ControlPeek(1),
        (Opcode::OuterIndex, _) => Op::ControlPeek(3),

        (Opcode::Begin, _) => Op::Mark(here),
        (Opcode::Times, None) => Op::MarkCounted(here),
        (Opcode::Times, Some(w)) => Op::MarkCountedImm {
            count: w,
            marker: here,
        },

        (Opcode::Where, _) => Op::Where,

        (Opcode::Define, _) => {
            let Some(end) = target else {
                return (None, None);
            };
            let op = match imm {
                Some(w) => Op::DefineAt {
                    slot: literal_address(w),
                    entry: here,
                },
                None => Op::Define { entry: here },
            };
            return (Some(op), Some(Exit::Goto(end + 1)));
        }

        (Opcode::If, _) => {
            return match target {
                Some(end) => (
                    None,
                    Some(Exit::IfZero {
                        skip_to: end + 1,
                        next,
                    }),
                ),
                None => (None, None),
            };
        }
        (Opcode::Else, _) => return (None, target.map(|end| Exit::Goto(end + 1))),
        (Opcode::EndIf, _) => return (None, None),

        (Opcode::While, _) => return (None, Some(Exit::While { next })),
        (Opcode::Loop, _) => return (None, Some(Exit::CountDown { next })),
        (Opcode::Return, _) => return (None, Some(Exit::Return)),
        (Opcode::Call, None) => return (None, Some(Exit::Call { ret: here, slot: None })),
        (Opcode::Call, Some(w)) => {
            let slot = Some(literal_address(w));
            return (None, Some(Exit::Call { ret: here, slot }));
        }
        (Opcode::Jump, None) => return (None, Some(Exit::Jump)),
        (Opcode::Jump, Some(w)) => return (None, Some(Exit::JumpTo(rol16(w)))),
        (Opcode::MediaSwitch, _) => {
            return (None, Some(Exit::Switch { at: addr, resume: next }));
        }
        (Opcode::Terminate, _) => return (None, Some(Exit::Terminate { at: addr })),
    };

    (Some(op), None)
}
