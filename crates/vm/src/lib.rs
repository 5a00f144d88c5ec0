//! IBNIZ virtual machine: compiles parsed programs to basic blocks and
//! evaluates them once per pixel or audio sample.
//!
//! The machine has:
//! - A data stack and a control stack, both visible through windows at the
//!   top of the 20-bit address space
//! - General memory that persists across samples and reloads
//! - A time counter and the current `x`/`y` sample coordinates
//!
//! # Usage
//!
//! ```
//! use ibniz_vm::{VmConfig, VM};
//! use ibniz_common::ONE;
//!
//! let mut vm = VM::with_source("5", VmConfig::default());
//! vm.set_time(3);
//! let sample = vm.run(10, 20);
//! assert_eq!(sample.video, 5 * ONE);
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod jit;
pub mod machine;
pub mod media;
pub mod memory;
pub mod stack;

pub use config::VmConfig;
pub use error::Fault;
pub use execute::PassEnd;
pub use jit::{compile, Compiled};
pub use machine::{Layout, Machine, Pass};
pub use media::{Sample, VM};
pub use memory::Addressing;
