//! IBNIZ common types and fixed-point arithmetic.
//!
//! This crate provides the foundational data structures shared by the
//! parser and the VM:
//!
//! - [`Opcode`]: every instruction character, decoded once
//! - [`Instruction`]: one program address, with fused literals and resolved targets
//! - [`Program`]: a sequence of instructions
//! - [`word`]: Q16.16 word arithmetic and [`rol16`]
//! - [`DecodeError`]: errors from decoding source characters
//!
//! # Usage
//!
//! ```
//! use ibniz_common::{rol16, word, Opcode, ONE};
//!
//! assert_eq!(Opcode::try_from('+'), Ok(Opcode::Add));
//! assert_eq!(word::mul(2 * ONE, 3 * ONE), 6 * ONE);
//! assert_eq!(rol16(5 * ONE), 5);
//! ```

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod word;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use program::Program;
pub use word::{rol16, Word, ONE};
