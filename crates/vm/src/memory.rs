//! The 20-bit address space.
//!
//! In full addressing the top of the address space aliases the two stacks:
//!
//! ```text
//! 0x00000-0xC7FFF   general memory       addr
//! 0xC8000-0xCFFFF   control stack        addr & 0x3FFF
//! 0xD0000-0xDFFFF   data stack           addr & 0xFFFF
//! 0xE0000-0xFFFFF   data stack           addr & 0x1FFFF
//! ```
//!
//! Simple addressing treats all of it as general memory.

use ibniz_common::Word;

/// Words of general memory.
pub const MEMORY_WORDS: usize = 1 << 20;

/// Mask applied to every computed address.
pub const ADDRESS_MASK: usize = MEMORY_WORDS - 1;

/// First address of the control-stack window in full addressing.
pub const STACK_WINDOWS_START: usize = 0xC8000;

/// How `@`, `!`, `{` and `V` interpret addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Addressing {
    /// General memory plus the stack windows.
    #[default]
    Full,
    /// One flat array of general memory.
    Simple,
}

/// Where an address lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Region {
    General(usize),
    Control(usize),
    Data(usize),
}

impl Addressing {
    /// Map an address to its region and index.
    pub(crate) fn decode(self, addr: usize) -> Region {
        let addr = addr & ADDRESS_MASK;
        match self {
            Addressing::Simple => Region::General(addr),
            Addressing::Full => match addr >> 15 {
                0..=24 => Region::General(addr),
                25 => Region::Control(addr & 0x3FFF),
                26 | 27 => Region::Data(addr & 0xFFFF),
                _ => Region::Data(addr & 0x1FFFF),
            },
        }
    }

    /// Returns true if a fixed address can skip window decoding.
    pub(crate) fn is_direct(self, addr: usize) -> bool {
        self == Addressing::Simple || addr < STACK_WINDOWS_START
    }
}

/// Persistent general memory.
#[derive(Debug, Clone)]
pub struct Memory {
    words: Box<[Word]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Zero-filled memory.
    pub fn new() -> Self {
        Self {
            words: vec![0; MEMORY_WORDS].into_boxed_slice(),
        }
    }

    /// Read the word at `addr`, masked to 20 bits.
    #[inline]
    pub fn get(&self, addr: usize) -> Word {
        self.words[addr & ADDRESS_MASK]
    }

    /// Write the word at `addr`, masked to 20 bits.
    #[inline]
    pub fn put(&mut self, addr: usize, value: Word) {
        self.words[addr & ADDRESS_MASK] = value;
    }

    /// Zero every word.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mode_regions() {
        let full = Addressing::Full;
        assert_eq!(full.decode(0), Region::General(0));
        assert_eq!(full.decode(0xC7FFF), Region::General(0xC7FFF));
        assert_eq!(full.decode(0xC8000), Region::Control(0));
        assert_eq!(full.decode(0xCC005), Region::Control(5));
        assert_eq!(full.decode(0xCFFFF), Region::Control(0x3FFF));
        assert_eq!(full.decode(0xD0002), Region::Data(2));
        assert_eq!(full.decode(0xDFFFF), Region::Data(0xFFFF));
        assert_eq!(full.decode(0xE0007), Region::Data(7));
        assert_eq!(full.decode(0xF0007), Region::Data(0x10007));
        assert_eq!(full.decode(0xFFFFF), Region::Data(0x1FFFF));
    }

    #[test]
    fn simple_mode_is_flat() {
        let simple = Addressing::Simple;
        assert_eq!(simple.decode(0xD0002), Region::General(0xD0002));
        assert_eq!(simple.decode(0x1_00005), Region::General(5));
    }

    #[test]
    fn decode_masks_to_twenty_bits() {
        assert_eq!(Addressing::Full.decode(0x1_00003), Region::General(3));
    }

    #[test]
    fn direct_addresses() {
        assert!(Addressing::Full.is_direct(0xC7FFF));
        assert!(!Addressing::Full.is_direct(0xC8000));
        assert!(Addressing::Simple.is_direct(0xFFFFF));
    }

    #[test]
    fn memory_get_put_clear() {
        let mut mem = Memory::new();
        assert_eq!(mem.get(10), 0);
        mem.put(10, 42);
        assert_eq!(mem.get(10), 42);
        assert_eq!(mem.get(10 + MEMORY_WORDS), 42);
        mem.clear();
        assert_eq!(mem.get(10), 0);
    }
}
