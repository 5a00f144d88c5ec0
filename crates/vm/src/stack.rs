//! The data and control stacks.
//!
//! Both stacks read 0 wherever nothing was written: popping an empty stack,
//! picking below the bottom, or peeking through the address-space window
//! above the top. Writes through the window above the top grow the stack
//! with zeros, up to the window size.

use ibniz_common::Word;

/// Words addressable through the data-stack window.
pub const DATA_CAPACITY: usize = 0x20000;

/// Words addressable through the control-stack window.
pub const CONTROL_CAPACITY: usize = 0x4000;

/// A bounded stack of words. Pushes past capacity are dropped.
#[derive(Debug, Clone)]
pub struct Stack {
    words: Vec<Word>,
    capacity: usize,
}

impl Stack {
    /// An empty stack holding at most `capacity` words.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: Vec::new(),
            capacity,
        }
    }

    /// Number of live words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if no words are live.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Drop every word.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// The live words, bottom first.
    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }

    /// Push `w`, or drop it when full.
    #[inline]
    pub fn push(&mut self, w: Word) {
        if self.words.len() < self.capacity {
            self.words.push(w);
        }
    }

    /// Pop the top word, or 0 when empty.
    #[inline]
    pub fn pop(&mut self) -> Word {
        self.words.pop().unwrap_or(0)
    }

    /// The top word, or 0 when empty.
    #[inline]
    pub fn top(&self) -> Word {
        self.words.last().copied().unwrap_or(0)
    }

    /// Read by absolute index from the bottom.
    pub fn get(&self, index: usize) -> Word {
        self.words.get(index).copied().unwrap_or(0)
    }

    /// Write by absolute index from the bottom.
    pub fn put(&mut self, index: usize, w: Word) {
        if index >= self.capacity {
            return;
        }
        if index >= self.words.len() {
            self.words.resize(index + 1, 0);
        }
        self.words[index] = w;
    }

    /// Read the word `n` below the top (`n = 0` is the top).
    pub fn from_top(&self, n: i64) -> Word {
        match self.index_from_top(n) {
            Some(index) => self.get(index),
            None => 0,
        }
    }

    /// Overwrite the word `n` below the top.
    pub fn put_from_top(&mut self, n: i64, w: Word) {
        if let Some(index) = self.index_from_top(n) {
            self.put(index, w);
        }
    }

    fn index_from_top(&self, n: i64) -> Option<usize> {
        let index = self.words.len() as i64 - 1 - n;
        usize::try_from(index).ok()
    }

    /// Push a copy of the top word.
    pub fn dup(&mut self) {
        let w = self.top();
        self.push(w);
    }

    /// Swap the top two words. No effect on fewer than two.
    pub fn exchange(&mut self) {
        let len = self.words.len();
        if len >= 2 {
            self.words.swap(len - 1, len - 2);
        }
    }

    /// `a b c -> b c a`. No effect on fewer than three.
    pub fn trirot(&mut self) {
        let len = self.words.len();
        if len >= 3 {
            self.words[len - 3..].rotate_left(1);
        }
    }

    /// `a b c -> c a b`. No effect on fewer than three.
    pub fn trirot_reverse(&mut self) {
        let len = self.words.len();
        if len >= 3 {
            self.words[len - 3..].rotate_right(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stack_of(words: &[Word]) -> Stack {
        let mut s = Stack::new(DATA_CAPACITY);
        for &w in words {
            s.push(w);
        }
        s
    }

    #[test]
    fn empty_reads_zero() {
        let mut s = Stack::new(4);
        assert_eq!(s.pop(), 0);
        assert_eq!(s.top(), 0);
        assert_eq!(s.from_top(0), 0);
        assert_eq!(s.get(3), 0);
    }

    #[test]
    fn push_past_capacity_dropped() {
        let mut s = Stack::new(2);
        s.push(1);
        s.push(2);
        s.push(3);
        assert_eq!(s.as_slice(), &[1, 2]);
    }

    #[test]
    fn put_above_top_grows_with_zeros() {
        let mut s = stack_of(&[7]);
        s.put(3, 9);
        assert_eq!(s.as_slice(), &[7, 0, 0, 9]);
    }

    #[test]
    fn put_past_capacity_ignored() {
        let mut s = Stack::new(4);
        s.put(4, 1);
        assert!(s.is_empty());
    }

    #[test]
    fn from_top_offsets() {
        let s = stack_of(&[1, 2, 3]);
        assert_eq!(s.from_top(0), 3);
        assert_eq!(s.from_top(2), 1);
        assert_eq!(s.from_top(3), 0);
        assert_eq!(s.from_top(-1), 0);
    }

    #[test]
    fn put_from_top_below_bottom_ignored() {
        let mut s = stack_of(&[1, 2]);
        s.put_from_top(5, 9);
        assert_eq!(s.as_slice(), &[1, 2]);
        s.put_from_top(1, 9);
        assert_eq!(s.as_slice(), &[9, 2]);
    }

    #[test]
    fn put_from_top_negative_writes_above() {
        let mut s = stack_of(&[1]);
        s.put_from_top(-2, 5);
        assert_eq!(s.as_slice(), &[1, 0, 5]);
    }

    #[test]
    fn exchange_and_rotations() {
        let mut s = stack_of(&[1, 2, 3]);
        s.exchange();
        assert_eq!(s.as_slice(), &[1, 3, 2]);

        let mut s = stack_of(&[1, 2, 3]);
        s.trirot();
        assert_eq!(s.as_slice(), &[2, 3, 1]);

        let mut s = stack_of(&[1, 2, 3]);
        s.trirot_reverse();
        assert_eq!(s.as_slice(), &[3, 1, 2]);
    }

    #[test]
    fn short_stack_rotations_are_no_ops() {
        let mut s = stack_of(&[1, 2]);
        s.trirot();
        s.trirot_reverse();
        assert_eq!(s.as_slice(), &[1, 2]);
        let mut s = stack_of(&[1]);
        s.exchange();
        assert_eq!(s.as_slice(), &[1]);
    }

    #[test]
    fn dup_on_empty_pushes_zero() {
        let mut s = Stack::new(4);
        s.dup();
        assert_eq!(s.as_slice(), &[0]);
    }

    proptest! {
        #[test]
        fn exchange_twice_restores(words in prop::collection::vec(any::<i32>(), 0..8)) {
            let mut s = stack_of(&words);
            s.exchange();
            s.exchange();
            prop_assert_eq!(s.as_slice(), &words[..]);
        }

        #[test]
        fn trirot_inverse(words in prop::collection::vec(any::<i32>(), 0..8)) {
            let mut s = stack_of(&words);
            s.trirot();
            s.trirot_reverse();
            prop_assert_eq!(s.as_slice(), &words[..]);

            s.trirot_reverse();
            s.trirot();
            prop_assert_eq!(s.as_slice(), &words[..]);
        }

        #[test]
        fn dup_pop_restores(words in prop::collection::vec(any::<i32>(), 1..8)) {
            let mut s = stack_of(&words);
            s.dup();
            s.pop();
            prop_assert_eq!(s.as_slice(), &words[..]);
        }
    }
}
