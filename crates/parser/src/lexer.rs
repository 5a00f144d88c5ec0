//! Tokenizer for IBNIZ source text.
//!
//! Every character is either part of a hexadecimal literal, an opcode, or
//! ignored. Tokens keep their character span so the fuser can tell whether
//! two tokens were written back to back.

use ibniz_common::opcode::is_literal_char;
use ibniz_common::word::from_parts;
use ibniz_common::{Opcode, Word};
use tracing::trace;

/// What a token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lexeme {
    /// A Q16.16 literal.
    Literal(Word),
    /// A single opcode character.
    Op(Opcode),
}

/// A lexeme and its character span `start..end` in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub lexeme: Lexeme,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Returns true if `next` starts exactly where this token ends.
    pub fn touches(&self, next: &Token) -> bool {
        self.end == next.start
    }
}

/// Split source text into tokens, skipping characters that are neither
/// literal digits nor opcodes.
pub(crate) fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if is_literal_char(c) {
            let start = i;
            while i < chars.len() && is_literal_char(chars[i]) {
                i += 1;
            }
            tokens.push(Token {
                lexeme: Lexeme::Literal(literal_value(&chars[start..i])),
                start,
                end: i,
            });
            continue;
        }

        match Opcode::try_from(c) {
            Ok(op) => tokens.push(Token {
                lexeme: Lexeme::Op(op),
                start: i,
                end: i + 1,
            }),
            Err(err) => trace!(at = i, %err, "skipping character"),
        }
        i += 1;
    }

    tokens
}

/// Assemble literal characters into a word.
///
/// Integer digits shift in from the right and keep the last four nibbles.
/// The first `.` switches to the fraction, which takes at most four
/// nibbles. Later dots and extra fraction digits are ignored.
fn literal_value(chars: &[char]) -> Word {
    let mut int_part: u32 = 0;
    let mut frac_part: u32 = 0;
    let mut frac_shift: i32 = 12;
    let mut in_fraction = false;

    for &c in chars {
        let Some(nibble) = c.to_digit(16) else {
            in_fraction = true;
            continue;
        };
        if !in_fraction {
            int_part = ((int_part << 4) | nibble) & 0xFFFF;
        } else if frac_shift >= 0 {
            frac_part |= nibble << frac_shift;
            frac_shift -= 4;
        }
    }

    from_parts(int_part, frac_part)
}
