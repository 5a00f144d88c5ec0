//! VM state: stacks, general memory, time and the current sample.

use crate::memory::{Addressing, Memory, Region};
use crate::stack::{Stack, CONTROL_CAPACITY, DATA_CAPACITY};
use ibniz_common::Word;

/// Which output a pass computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pass {
    #[default]
    Video,
    Audio,
}

/// How the video context is pushed at the start of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One word: `t<<16 | y<<8 | x`.
    Packed,
    /// Three words: `t<<16`, then `y` and `x` scaled to -1.0..1.0 (x on top).
    Tuple,
}

/// The machine state every block runs against.
#[derive(Debug, Clone)]
pub struct Machine {
    /// Operand stack.
    pub(crate) data: Stack,
    /// Return addresses and loop markers.
    pub(crate) control: Stack,
    /// General memory, kept across samples and loads.
    pub(crate) memory: Memory,
    /// How `get` and `put` decode addresses.
    pub(crate) addressing: Addressing,
    /// Time counter set by the host.
    pub(crate) time: u16,
    /// Column of the current sample.
    pub(crate) x: u8,
    /// Row of the current sample.
    pub(crate) y: u8,
    /// The pass being run.
    pub(crate) pass: Pass,
    /// `None` while calibrating: `w` pushes nothing.
    pub(crate) layout: Option<Layout>,
    /// Whether `M` may hand over to the audio pass.
    pub(crate) allow_switch: bool,
}

impl Machine {
    /// Empty stacks, zeroed memory, no layout yet.
    pub fn new(addressing: Addressing) -> Self {
        Self {
            data: Stack::new(DATA_CAPACITY),
            control: Stack::new(CONTROL_CAPACITY),
            memory: Memory::new(),
            addressing,
            time: 0,
            x: 0,
            y: 0,
            pass: Pass::Video,
            layout: None,
            allow_switch: false,
        }
    }

    /// Clear both stacks and set up the next pass. Pushes nothing.
    pub(crate) fn reset(&mut self, pass: Pass, x: u8, y: u8) {
        self.data.clear();
        self.control.clear();
        self.pass = pass;
        self.x = x;
        self.y = y;
    }

    /// Read through the address space.
    pub(crate) fn get(&self, addr: usize) -> Word {
        match self.addressing.decode(addr) {
            Region::General(i) => self.memory.get(i),
            Region::Control(i) => self.control.get(i),
            Region::Data(i) => self.data.get(i),
        }
    }

    /// Write through the address space.
    pub(crate) fn put(&mut self, addr: usize, value: Word) {
        match self.addressing.decode(addr) {
            Region::General(i) => self.memory.put(i, value),
            Region::Control(i) => self.control.put(i, value),
            Region::Data(i) => self.data.put(i, value),
        }
    }

    /// The packed context word `t<<16 | y<<8 | x`.
    pub(crate) fn packed_context(&self) -> Word {
        ((self.time as u32) << 16 | (self.y as u32) << 8 | self.x as u32) as Word
    }

    /// The audio context word `t<<16 + (y<<8 + x)`.
    pub(crate) fn audio_context(&self) -> Word {
        ((self.time as Word) << 16).wrapping_add(((self.y as Word) << 8) + self.x as Word)
    }

    /// Push the sample context for the current pass and layout.
    pub(crate) fn push_context(&mut self) {
        match (self.pass, self.layout) {
            (Pass::Audio, _) => {
                let w = self.audio_context();
                self.data.push(w);
            }
            (Pass::Video, Some(Layout::Packed)) => {
                let w = self.packed_context();
                self.data.push(w);
            }
            (Pass::Video, Some(Layout::Tuple)) => {
                self.data.push((self.time as Word) << 16);
                self.data.push(((self.y as Word) << 9) - 0x1_0000);
                self.data.push(((self.x as Word) << 9) - 0x1_0000);
            }
            (Pass::Video, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> Machine {
        Machine::new(Addressing::Full)
    }

    #[test]
    fn packed_context_layout() {
        let mut m = machine();
        m.time = 0x1234;
        m.reset(Pass::Video, 0x56, 0x78);
        assert_eq!(m.packed_context(), 0x1234_7856);
    }

    #[test]
    fn tuple_context_scales_coordinates() {
        let mut m = machine();
        m.layout = Some(Layout::Tuple);
        m.time = 2;
        m.reset(Pass::Video, 0x80, 0);
        m.push_context();
        assert_eq!(m.data.as_slice(), &[0x2_0000, -0x1_0000, 0]);
    }

    #[test]
    fn audio_context_ignores_layout() {
        let mut m = machine();
        m.layout = Some(Layout::Tuple);
        m.time = 1;
        m.reset(Pass::Audio, 3, 2);
        m.push_context();
        assert_eq!(m.data.as_slice(), &[0x1_0203]);
    }

    #[test]
    fn calibrating_context_is_empty() {
        let mut m = machine();
        m.reset(Pass::Video, 1, 1);
        m.push_context();
        assert!(m.data.is_empty());
    }

    #[test]
    fn reset_clears_both_stacks() {
        let mut m = machine();
        m.data.push(1);
        m.control.push(2);
        m.memory.put(3, 4);
        m.reset(Pass::Audio, 0, 0);
        assert!(m.data.is_empty());
        assert!(m.control.is_empty());
        assert_eq!(m.memory.get(3), 4);
    }

    #[test]
    fn windows_alias_stacks() {
        let mut m = machine();
        m.data.push(10);
        m.data.push(20);
        m.control.push(30);
        assert_eq!(m.get(0xD0001), 20);
        assert_eq!(m.get(0xE0000), 10);
        assert_eq!(m.get(0xC8000), 30);
        m.put(0xD0000, 11);
        assert_eq!(m.data.as_slice(), &[11, 20]);
        m.put(0x100, 5);
        assert_eq!(m.memory.get(0x100), 5);
    }

    #[test]
    fn simple_addressing_ignores_windows() {
        let mut m = Machine::new(Addressing::Simple);
        m.data.push(10);
        m.put(0xD0000, 7);
        assert_eq!(m.data.as_slice(), &[10]);
        assert_eq!(m.get(0xD0000), 7);
    }
}
