//! Decode errors for IBNIZ source symbols.

use thiserror::Error;

/// Errors that occur when decoding a source character into an opcode.
///
/// The lexer never surfaces these: an undecodable character is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The character is not an opcode symbol.
    #[error("unknown symbol {0:?}")]
    UnknownSymbol(char),

    /// The character is a literal digit, not an opcode.
    #[error("literal digit {0:?} is not an opcode")]
    LiteralDigit(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_symbol() {
        assert_eq!(
            DecodeError::UnknownSymbol('#').to_string(),
            "unknown symbol '#'"
        );
    }

    #[test]
    fn display_literal_digit() {
        assert_eq!(
            DecodeError::LiteralDigit('A').to_string(),
            "literal digit 'A' is not an opcode"
        );
    }
}
