//! VM configuration.

use crate::memory::Addressing;

/// Settings fixed for the lifetime of a [`crate::VM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VmConfig {
    /// Address-space mode for `@`, `!`, `{` and `V`.
    pub addressing: Addressing,
    /// Compute an audio word per sample. When off, `M` faults.
    pub audio: bool,
    /// Always run a separate audio pass, even when the video word could be
    /// reused.
    pub recalc_audio: bool,
    /// Zero general memory on every load and reload.
    pub clear_memory_on_load: bool,
}

impl VmConfig {
    /// Set the address-space mode.
    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    /// Turn the audio pass on or off.
    pub fn with_audio(mut self, audio: bool) -> Self {
        self.audio = audio;
        self
    }

    /// Force a separate audio pass.
    pub fn with_recalc_audio(mut self, recalc_audio: bool) -> Self {
        self.recalc_audio = recalc_audio;
        self
    }

    /// Zero general memory on every load.
    pub fn with_clear_memory_on_load(mut self, clear: bool) -> Self {
        self.clear_memory_on_load = clear;
        self
    }
}
