//! Pass faults for the IBNIZ VM.
//!
//! A fault ends the current pass, never the VM. The media controller reads
//! the stack as it stands and records the fault for [`crate::VM::last_fault`].

use thiserror::Error;

/// The reason a pass stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// `T` executed.
    #[error("terminated at instruction {at}")]
    Terminated { at: usize },

    /// `M` executed while switching to audio is not allowed.
    #[error("media switch not allowed at instruction {at}")]
    IllegalMediaSwitch { at: usize },

    /// Execution ran past the last instruction.
    #[error("end of program")]
    EndOfProgram,

    /// A jump, call or return targeted an address outside the program.
    #[error("jump to {target} outside the program")]
    OutOfRange { target: i64 },
}
