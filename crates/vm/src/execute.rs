//! Block execution and the dispatch loop.

use crate::error::Fault;
use crate::jit::{BinOp, Compiled, Exit, Op, UnOp};
use crate::machine::Machine;
use crate::memory::ADDRESS_MASK;
use ibniz_common::{rol16, word, Word, ONE};
use tracing::trace;

/// Where control goes after a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Goto(i64),
    Halt(Fault),
    Switch { video: Word, resume: usize },
}

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassEnd {
    /// The pass stopped; the result is whatever the stack holds.
    Halted(Fault),
    /// `M` popped the video word and the audio pass should resume here.
    Switched { video: Word, resume: usize },
}

impl BinOp {
    fn apply(self, second: Word, top: Word) -> Word {
        match self {
            BinOp::Add => second.wrapping_add(top),
            BinOp::Sub => second.wrapping_sub(top),
            BinOp::Mul => word::mul(second, top),
            BinOp::Div => word::div(second, top),
            BinOp::Mod => word::modulo(second, top),
            BinOp::And => second & top,
            BinOp::Or => second | top,
            BinOp::Xor => second ^ top,
            BinOp::Shift => word::shift(second, top),
            BinOp::Rotate => word::rotate(second, top),
            BinOp::Atan2 => word::atan2(top, second),
        }
    }
}

impl UnOp {
    fn apply(self, w: Word) -> Word {
        match self {
            UnOp::Sin => word::sin(w),
            UnOp::Sqrt => word::sqrt(w),
            UnOp::Not => !w,
            UnOp::ClampNeg => word::clamp_neg(w),
            UnOp::ClampPos => word::clamp_pos(w),
            UnOp::IsZero => word::is_zero(w),
        }
    }
}

/// Address named by a popped word.
#[inline]
fn address(w: Word) -> usize {
    rol16(w) as u32 as usize & ADDRESS_MASK
}

/// Jump target named by a word.
#[inline]
fn jump_target(w: Word) -> i64 {
    rol16(w) as i64
}

impl Machine {
    /// Run from `start` until the pass halts or switches media.
    pub fn dispatch(&mut self, code: &Compiled, start: usize) -> PassEnd {
        let mut ip = start as i64;
        loop {
            let entry = usize::try_from(ip).ok().and_then(|i| code.entries.get(i));
            let Some(&(block, offset)) = entry else {
                let fault = if ip == code.len() as i64 {
                    Fault::EndOfProgram
                } else {
                    Fault::OutOfRange { target: ip }
                };
                return PassEnd::Halted(fault);
            };

            let block = &code.blocks[block];
            for op in &block.ops[offset..] {
                self.step(op);
            }
            match self.transfer(&block.exit) {
                Flow::Goto(next) => ip = next,
                Flow::Halt(fault) => return PassEnd::Halted(fault),
                Flow::Switch { video, resume } => return PassEnd::Switched { video, resume },
            }
        }
    }

    fn step(&mut self, op: &Op) {
        match *op {
            Op::Push(w) => self.data.push(w),
            Op::PushTwice(w) => {
                self.data.push(w);
                self.data.push(w);
            }
            Op::Binary(bin) => {
                let top = self.data.pop();
                let second = self.data.pop();
                self.data.push(bin.apply(second, top));
            }
            Op::BinaryImm(bin, w) => {
                let second = self.data.pop();
                self.data.push(bin.apply(second, w));
            }
            Op::Unary(un) => {
                let w = self.data.pop();
                self.data.push(un.apply(w));
            }

            Op::Dup => self.data.dup(),
            Op::Drop => {
                self.data.pop();
            }
            Op::Exchange => self.data.exchange(),
            Op::TriRot => self.data.trirot(),
            Op::TriRotReverse => self.data.trirot_reverse(),
            Op::Pick => {
                let n = rol16(self.data.pop()) as i64;
                let w = self.data.from_top(n);
                self.data.push(w);
            }
            Op::PickAt(n) => {
                let w = self.data.from_top(n);
                self.data.push(w);
            }
            Op::Bury => {
                let n = rol16(self.data.pop()) as i64;
                let w = self.data.pop();
                self.data.put_from_top(n, w);
            }
            Op::BuryAt(n) => {
                let w = self.data.pop();
                self.data.put_from_top(n, w);
            }

            Op::Load => {
                let at = address(self.data.pop());
                let w = self.get(at);
                self.data.push(w);
            }
            Op::LoadAt(at) => {
                let w = self.get(at);
                self.data.push(w);
            }
            Op::LoadDirect(at) => self.data.push(self.memory.get(at)),
            Op::Store => {
                let at = address(self.data.pop());
                let w = self.data.pop();
                self.put(at, w);
            }
            Op::StoreAt(at) => {
                let w = self.data.pop();
                self.put(at, w);
            }
            Op::StoreDirect(at) => {
                let w = self.data.pop();
                self.memory.put(at, w);
            }

            Op::FromControl => {
                let w = self.control.pop();
                self.data.push(w);
            }
            Op::ToControl => {
                let w = self.data.pop();
                self.control.push(w);
            }
            Op::ToControlImm(w) => self.control.push(w),
            Op::ControlPeek(n) => self.data.push(self.control.from_top(n)),

            Op::Mark(marker) => self.control.push(marker),
            Op::MarkCounted(marker) => {
                let count = self.data.pop();
                self.control.push(count);
                self.control.push(marker);
            }
            Op::MarkCountedImm { count, marker } => {
                self.control.push(count);
                self.control.push(marker);
            }

            Op::Define { entry } => {
                let slot = address(self.data.pop());
                self.put(slot, entry);
            }
            Op::DefineAt { slot, entry } => self.put(slot, entry),

            Op::Where => self.push_context(),
        }
    }

    fn transfer(&mut self, exit: &Exit) -> Flow {
        match *exit {
            Exit::Goto(next) => Flow::Goto(next as i64),
            Exit::IfZero { skip_to, next } => {
                if self.data.pop() == 0 {
                    Flow::Goto(skip_to as i64)
                } else {
                    Flow::Goto(next as i64)
                }
            }
            Exit::While { next } => {
                if self.data.pop() != 0 {
                    Flow::Goto(jump_target(self.control.top()))
                } else {
                    self.control.pop();
                    Flow::Goto(next as i64)
                }
            }
            Exit::CountDown { next } => {
                if self.control.len() < 2 {
                    // No counter to decrement: drop what is there.
                    self.control.clear();
                    return Flow::Goto(next as i64);
                }
                let count = self.control.from_top(1).wrapping_sub(ONE);
                self.control.put_from_top(1, count);
                if count != 0 {
                    Flow::Goto(jump_target(self.control.top()))
                } else {
                    self.control.pop();
                    self.control.pop();
                    Flow::Goto(next as i64)
                }
            }
            Exit::Return => Flow::Goto(jump_target(self.control.pop())),
            Exit::Call { ret, slot } => {
                self.control.push(ret);
                let slot = match slot {
                    Some(at) => at,
                    None => address(self.data.pop()),
                };
                Flow::Goto(jump_target(self.get(slot)))
            }
            Exit::Jump => Flow::Goto(jump_target(self.data.pop())),
            Exit::JumpTo(target) => Flow::Goto(target as i64),
            Exit::Switch { at, resume } => {
                if self.allow_switch {
                    Flow::Switch {
                        video: self.data.pop(),
                        resume,
                    }
                } else {
                    trace!(at, "media switch refused");
                    Flow::Halt(Fault::IllegalMediaSwitch { at })
                }
            }
            Exit::Terminate { at } => Flow::Halt(Fault::Terminated { at }),
        }
    }
}
