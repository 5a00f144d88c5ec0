//! Media-pass controller.
//!
//! Each call to [`VM::run`] evaluates the program for one sample:
//!
//! 1. Reset both stacks and push the video context in the calibrated layout.
//! 2. Dispatch from address 0. If the pass ends, its top of stack is the
//!    video word.
//! 3. If audio is on and `M` ran, `M` popped the video word; the audio pass
//!    resumes after `M` on fresh stacks holding the audio context.
//! 4. If audio is on and `M` did not run, a packed program reuses the video
//!    word unless recomputation is forced; otherwise a full audio pass runs
//!    from address 0.
//!
//! Calibration runs once per load: a dry pass on the neutral zero triple
//! with `w` pushing nothing, against zeroed scratch memory that is thrown
//! away afterwards. More than one word left means the program ignored the
//! triple and expects a single packed word.

use crate::config::VmConfig;
use crate::error::Fault;
use crate::execute::PassEnd;
use crate::jit::{compile, Compiled};
use crate::machine::{Layout, Machine, Pass};
use crate::memory::{Memory, ADDRESS_MASK};
use ibniz_common::{Program, Word};
use ibniz_parser::parse;
use tracing::{debug, trace};

/// The result of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    /// Video word: bits 31..24 chroma V, 23..16 chroma U, 15..8 luma.
    pub video: Word,
    /// Audio word; the low 16 bits are the PCM sample.
    pub audio: Word,
}

impl Sample {
    /// Bits 15..8 of the video word.
    pub fn luma(&self) -> u8 {
        (self.video >> 8) as u8
    }

    /// Bits 23..16 of the video word.
    pub fn chroma_u(&self) -> u8 {
        (self.video >> 16) as u8
    }

    /// Bits 31..24 of the video word.
    pub fn chroma_v(&self) -> u8 {
        (self.video >> 24) as u8
    }

    /// Low 16 bits of the audio word as a signed sample.
    pub fn audio_pcm(&self) -> i16 {
        self.audio as i16
    }
}

/// An IBNIZ virtual machine with a loaded program.
pub struct VM {
    config: VmConfig,
    source: String,
    program: Program,
    code: Compiled,
    machine: Machine,
    layout: Layout,
    last_fault: Option<Fault>,
}

impl VM {
    /// A VM with the empty program loaded.
    pub fn new(config: VmConfig) -> Self {
        let mut vm = Self {
            config,
            source: String::new(),
            program: Program::default(),
            code: Compiled::default(),
            machine: Machine::new(config.addressing),
            layout: Layout::Packed,
            last_fault: None,
        };
        vm.reload();
        vm
    }

    /// A VM with `source` loaded.
    pub fn with_source(source: &str, config: VmConfig) -> Self {
        let mut vm = Self::new(config);
        vm.load(source);
        vm
    }

    /// Replace the program. Never fails: unreadable characters are skipped.
    pub fn load(&mut self, source: &str) {
        self.source = source.to_string();
        self.reload();
    }

    /// Recompile the stored source and recalibrate.
    ///
    /// General memory survives unless `clear_memory_on_load` is set.
    pub fn reload(&mut self) {
        self.program = parse(&self.source);
        self.code = compile(&self.program, self.config.addressing);
        if self.config.clear_memory_on_load {
            self.machine.memory.clear();
        }
        self.layout = self.calibrate();
        self.machine.layout = Some(self.layout);
        debug!(
            instructions = self.program.len(),
            blocks = self.code.block_count(),
            layout = ?self.layout,
            "loaded program"
        );
    }

    /// Dry-run the program on the zero triple and a scratch memory, so the
    /// layout depends on the source alone.
    fn calibrate(&mut self) -> Layout {
        let memory = std::mem::replace(&mut self.machine.memory, Memory::new());
        self.machine.layout = None;
        self.machine.allow_switch = false;
        self.machine.reset(Pass::Video, 0, 0);
        for _ in 0..3 {
            self.machine.data.push(0);
        }
        let end = self.machine.dispatch(&self.code, 0);
        let left = self.machine.data.len();
        self.machine.memory = memory;
        let layout = if left > 1 {
            Layout::Packed
        } else {
            Layout::Tuple
        };
        debug!(?end, left, ?layout, "calibrated");
        layout
    }

    /// Evaluate one sample.
    pub fn run(&mut self, x: u8, y: u8) -> Sample {
        self.begin(Pass::Video, x, y, self.config.audio);
        let end = self.machine.dispatch(&self.code, 0);

        match end {
            PassEnd::Switched { video, resume } => {
                self.begin(Pass::Audio, x, y, false);
                let end = self.machine.dispatch(&self.code, resume);
                self.finish(end);
                let audio = self.machine.data.pop();
                Sample { video, audio }
            }
            PassEnd::Halted(fault) => {
                self.record(fault);
                let video = self.machine.data.pop();
                let audio = if !self.config.audio {
                    0
                } else if self.layout == Layout::Packed && !self.config.recalc_audio {
                    video
                } else {
                    self.begin(Pass::Audio, x, y, false);
                    let end = self.machine.dispatch(&self.code, 0);
                    self.finish(end);
                    self.machine.data.pop()
                };
                Sample { video, audio }
            }
        }
    }

    fn begin(&mut self, pass: Pass, x: u8, y: u8, allow_switch: bool) {
        self.machine.reset(pass, x, y);
        self.machine.allow_switch = allow_switch;
        self.machine.push_context();
    }

    fn finish(&mut self, end: PassEnd) {
        match end {
            PassEnd::Halted(fault) => self.record(fault),
            // Switching is refused during the audio pass.
            PassEnd::Switched { .. } => {}
        }
    }

    fn record(&mut self, fault: Fault) {
        trace!(%fault, "pass ended");
        self.last_fault = Some(fault);
    }

    /// Set the time counter; only the low 16 bits are kept.
    pub fn set_time(&mut self, t: u32) {
        self.machine.time = (t & 0xFFFF) as u16;
    }

    /// The current time counter.
    pub fn time(&self) -> u16 {
        self.machine.time
    }

    /// Read general memory directly, bypassing the stack windows.
    pub fn peek(&self, addr: u32) -> Word {
        self.machine.memory.get(addr as usize & ADDRESS_MASK)
    }

    /// Write general memory directly, bypassing the stack windows.
    pub fn poke(&mut self, addr: u32, value: Word) {
        self.machine.memory.put(addr as usize & ADDRESS_MASK, value);
    }

    /// The context layout chosen by calibration.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// The fault that ended the most recent pass.
    pub fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }

    /// The settings this VM was built with.
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// The source text last loaded.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The compiled blocks.
    pub fn compiled(&self) -> &Compiled {
        &self.code
    }
}
