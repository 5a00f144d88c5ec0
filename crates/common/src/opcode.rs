//! Opcode definitions for the IBNIZ instruction set.
//!
//! Every opcode is a single source character, except [`Opcode::TriRotReverse`]
//! which only arises from two adjacent `v` characters.

use crate::error::DecodeError;

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Arithmetic
    /// `+` second + top.
    Add,
    /// `-` second - top.
    Sub,
    /// `*` fixed-point product.
    Mul,
    /// `/` fixed-point quotient. Division by zero yields 0.
    Div,
    /// `%` remainder. Modulo by zero yields 0.
    Mod,
    /// `&` bitwise and.
    And,
    /// `|` bitwise or.
    Or,
    /// `^` bitwise xor.
    Xor,
    /// `~` bitwise not.
    Not,
    /// `l` shift left for amounts 0..32, arithmetic right for 32..64.
    Shift,
    /// `r` rotate right.
    Rotate,
    /// `s` sine, one turn = 1.0.
    Sin,
    /// `q` square root, zero for negative input.
    Sqrt,
    /// `a` atan2(top, second), one turn = 1.0.
    Atan2,
    /// `<` keep the value if negative, else 0.
    ClampNeg,
    /// `>` keep the value if positive, else 0.
    ClampPos,
    /// `=` 1 if zero, else 0.
    IsZero,

    // Stack
    /// `d` duplicate top.
    Dup,
    /// `p` pop.
    Pop,
    /// `x` exchange top two.
    Exchange,
    /// `v` rotate top three, bringing the third word to the top.
    TriRot,
    /// `vv` rotate top three the other way.
    TriRotReverse,
    /// `)` push a copy of the word `n` below the top.
    Pick,
    /// `(` overwrite the word `n` below the top.
    Bury,

    // Memory
    /// `@` load through the address space.
    Load,
    /// `!` store through the address space.
    Store,

    // Control stack
    /// `R` move control top to data stack.
    FromControl,
    /// `P` move data top to control stack.
    ToControl,
    /// `i` innermost loop counter.
    Index,
    /// `j` next-outer loop counter.
    OuterIndex,

    // Loops
    /// `[` begin a conditional loop.
    Begin,
    /// `]` loop back while the popped word is nonzero.
    While,
    /// `X` begin a counted loop.
    Times,
    /// `L` decrement the counter and loop back while nonzero.
    Loop,

    // Conditionals
    /// `?` skip to the else branch when the popped word is zero.
    If,
    /// `:` else.
    Else,
    /// `;` end of conditional.
    EndIf,

    // Subroutines
    /// `{` define a subroutine.
    Define,
    /// `}` return from a subroutine.
    Return,
    /// `V` call a subroutine.
    Call,
    /// `J` jump.
    Jump,

    // Media
    /// `w` push the sample context.
    Where,
    /// `M` end the video pass and continue as audio.
    MediaSwitch,
    /// `T` terminate the pass.
    Terminate,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 44] = [
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Mod,
    Opcode::And,
    Opcode::Or,
    Opcode::Xor,
    Opcode::Not,
    Opcode::Shift,
    Opcode::Rotate,
    Opcode::Sin,
    Opcode::Sqrt,
    Opcode::Atan2,
    Opcode::ClampNeg,
    Opcode::ClampPos,
    Opcode::IsZero,
    Opcode::Dup,
    Opcode::Pop,
    Opcode::Exchange,
    Opcode::TriRot,
    Opcode::TriRotReverse,
    Opcode::Pick,
    Opcode::Bury,
    Opcode::Load,
    Opcode::Store,
    Opcode::FromControl,
    Opcode::ToControl,
    Opcode::Index,
    Opcode::OuterIndex,
    Opcode::Begin,
    Opcode::While,
    Opcode::Times,
    Opcode::Loop,
    Opcode::If,
    Opcode::Else,
    Opcode::EndIf,
    Opcode::Define,
    Opcode::Return,
    Opcode::Call,
    Opcode::Jump,
    Opcode::Where,
    Opcode::MediaSwitch,
    Opcode::Terminate,
];

/// Returns true if `c` belongs to a numeric literal (`0-9`, `A-F`, `.`).
pub fn is_literal_char(c: char) -> bool {
    c.is_ascii_digit() || ('A'..='F').contains(&c) || c == '.'
}

impl TryFrom<char> for Opcode {
    type Error = DecodeError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '+' => Ok(Opcode::Add),
            '-' => Ok(Opcode::Sub),
            '*' => Ok(Opcode::Mul),
            '/' => Ok(Opcode::Div),
            '%' => Ok(Opcode::Mod),
            '&' => Ok(Opcode::And),
            '|' => Ok(Opcode::Or),
            '^' => Ok(Opcode::Xor),
            '~' => Ok(Opcode::Not),
            'l' => Ok(Opcode::Shift),
            'r' => Ok(Opcode::Rotate),
            's' => Ok(Opcode::Sin),
            'q' => Ok(Opcode::Sqrt),
            'a' => Ok(Opcode::Atan2),
            '<' => Ok(Opcode::ClampNeg),
            '>' => Ok(Opcode::ClampPos),
            '=' => Ok(Opcode::IsZero),

            'd' => Ok(Opcode::Dup),
            'p' => Ok(Opcode::Pop),
            'x' => Ok(Opcode::Exchange),
            'v' => Ok(Opcode::TriRot),
            ')' => Ok(Opcode::Pick),
            '(' => Ok(Opcode::Bury),

            '@' => Ok(Opcode::Load),
            '!' => Ok(Opcode::Store),

            'R' => Ok(Opcode::FromControl),
            'P' => Ok(Opcode::ToControl),
            'i' => Ok(Opcode::Index),
            'j' => Ok(Opcode::OuterIndex),

            '[' => Ok(Opcode::Begin),
            ']' => Ok(Opcode::While),
            'X' => Ok(Opcode::Times),
            'L' => Ok(Opcode::Loop),

            '?' => Ok(Opcode::If),
            ':' => Ok(Opcode::Else),
            ';' => Ok(Opcode::EndIf),

            '{' => Ok(Opcode::Define),
            '}' => Ok(Opcode::Return),
            'V' => Ok(Opcode::Call),
            'J' => Ok(Opcode::Jump),

            'w' => Ok(Opcode::Where),
            'M' => Ok(Opcode::MediaSwitch),
            'T' => Ok(Opcode::Terminate),

            c if is_literal_char(c) => Err(DecodeError::LiteralDigit(c)),
            c => Err(DecodeError::UnknownSymbol(c)),
        }
    }
}

impl Opcode {
    /// Returns the source spelling of this opcode.
    pub fn symbol(&self) -> &'static str {
        match self {
            Opcode::Add => "+",
            Opcode::Sub => "-",
            Opcode::Mul => "*",
            Opcode::Div => "/",
            Opcode::Mod => "%",
            Opcode::And => "&",
            Opcode::Or => "|",
            Opcode::Xor => "^",
            Opcode::Not => "~",
            Opcode::Shift => "l",
            Opcode::Rotate => "r",
            Opcode::Sin => "s",
            Opcode::Sqrt => "q",
            Opcode::Atan2 => "a",
            Opcode::ClampNeg => "<",
            Opcode::ClampPos => ">",
            Opcode::IsZero => "=",
            Opcode::Dup => "d",
            Opcode::Pop => "p",
            Opcode::Exchange => "x",
            Opcode::TriRot => "v",
            Opcode::TriRotReverse => "vv",
            Opcode::Pick => ")",
            Opcode::Bury => "(",
            Opcode::Load => "@",
            Opcode::Store => "!",
            Opcode::FromControl => "R",
            Opcode::ToControl => "P",
            Opcode::Index => "i",
            Opcode::OuterIndex => "j",
            Opcode::Begin => "[",
            Opcode::While => "]",
            Opcode::Times => "X",
            Opcode::Loop => "L",
            Opcode::If => "?",
            Opcode::Else => ":",
            Opcode::EndIf => ";",
            Opcode::Define => "{",
            Opcode::Return => "}",
            Opcode::Call => "V",
            Opcode::Jump => "J",
            Opcode::Where => "w",
            Opcode::MediaSwitch => "M",
            Opcode::Terminate => "T",
        }
    }

    /// Returns the listing mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Not => "NOT",
            Opcode::Shift => "SHIFT",
            Opcode::Rotate => "ROR",
            Opcode::Sin => "SIN",
            Opcode::Sqrt => "SQRT",
            Opcode::Atan2 => "ATAN2",
            Opcode::ClampNeg => "NEG_PART",
            Opcode::ClampPos => "POS_PART",
            Opcode::IsZero => "IS_ZERO",
            Opcode::Dup => "DUP",
            Opcode::Pop => "POP",
            Opcode::Exchange => "EXCHANGE",
            Opcode::TriRot => "TRIROT",
            Opcode::TriRotReverse => "TRIROT_REV",
            Opcode::Pick => "PICK",
            Opcode::Bury => "BURY",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::FromControl => "FROM_CONTROL",
            Opcode::ToControl => "TO_CONTROL",
            Opcode::Index => "INDEX",
            Opcode::OuterIndex => "OUTER_INDEX",
            Opcode::Begin => "BEGIN",
            Opcode::While => "WHILE",
            Opcode::Times => "TIMES",
            Opcode::Loop => "LOOP",
            Opcode::If => "IF",
            Opcode::Else => "ELSE",
            Opcode::EndIf => "ENDIF",
            Opcode::Define => "DEFINE",
            Opcode::Return => "RETURN",
            Opcode::Call => "CALL",
            Opcode::Jump => "JUMP",
            Opcode::Where => "WHERE",
            Opcode::MediaSwitch => "MEDIA_SWITCH",
            Opcode::Terminate => "TERMINATE",
        }
    }

    /// Returns true if a literal written directly before this opcode is
    /// fused into it instead of being pushed.
    pub fn takes_immediate(&self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::And
                | Opcode::Or
                | Opcode::Xor
                | Opcode::Not
                | Opcode::Shift
                | Opcode::Rotate
                | Opcode::Sin
                | Opcode::Sqrt
                | Opcode::Atan2
                | Opcode::Dup
                | Opcode::Pop
                | Opcode::Pick
                | Opcode::Bury
                | Opcode::Load
                | Opcode::Store
                | Opcode::ToControl
                | Opcode::Times
                | Opcode::Define
                | Opcode::Call
                | Opcode::Jump
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_opcodes_count() {
        assert_eq!(ALL_OPCODES.len(), 44);
    }

    #[test]
    fn symbol_roundtrip_single_char_opcodes() {
        for &opcode in &ALL_OPCODES {
            if opcode == Opcode::TriRotReverse {
                continue;
            }
            let mut chars = opcode.symbol().chars();
            let c = chars.next().unwrap();
            assert!(chars.next().is_none(), "{opcode:?} has a multi-char symbol");
            assert_eq!(Opcode::try_from(c), Ok(opcode), "roundtrip failed for {c:?}");
        }
    }

    #[test]
    fn reverse_rotation_has_no_single_char() {
        assert_eq!(Opcode::TriRotReverse.symbol(), "vv");
        assert_eq!(Opcode::try_from('v'), Ok(Opcode::TriRot));
    }

    #[test]
    fn literal_digits_are_not_opcodes() {
        for c in "0123456789ABCDEF.".chars() {
            assert_eq!(Opcode::try_from(c), Err(DecodeError::LiteralDigit(c)));
        }
    }

    #[test]
    fn lowercase_hex_letters_are_opcodes_or_unknown() {
        // `a` is atan2 and `d` is dup; the other lowercase hex letters are unused.
        assert_eq!(Opcode::try_from('a'), Ok(Opcode::Atan2));
        assert_eq!(Opcode::try_from('d'), Ok(Opcode::Dup));
        for c in ['b', 'c', 'e', 'f'] {
            assert_eq!(Opcode::try_from(c), Err(DecodeError::UnknownSymbol(c)));
        }
    }

    #[test]
    fn whitespace_and_punctuation_are_unknown() {
        for c in [' ', '\n', '\t', '#', ',', '"', 'G', 'Z', 'é'] {
            assert_eq!(Opcode::try_from(c), Err(DecodeError::UnknownSymbol(c)));
        }
    }

    #[test]
    fn every_ascii_char_resolves() {
        for byte in 0..=127u8 {
            let c = byte as char;
            match Opcode::try_from(c) {
                Ok(_) | Err(DecodeError::UnknownSymbol(_)) | Err(DecodeError::LiteralDigit(_)) => {}
            }
        }
    }

    #[test]
    fn immediate_consumers() {
        let consumers: String = ALL_OPCODES
            .iter()
            .filter(|op| op.takes_immediate())
            .map(|op| op.symbol())
            .collect();
        assert_eq!(consumers, "+-*/%&|^~lrsqadp)(@!PX{VJ");
    }

    #[test]
    fn mnemonics_are_uppercase() {
        for &opcode in &ALL_OPCODES {
            let m = opcode.mnemonic();
            assert!(!m.is_empty(), "empty mnemonic for {opcode:?}");
            assert_eq!(m, m.to_uppercase(), "mnemonic should be uppercase: {m}");
        }
    }
}
