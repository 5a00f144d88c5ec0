//! Configuration file parsing.

use anyhow::Context;
use ibniz_vm::{Addressing, VmConfig};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub vm: VmSection,
}

/// The `[vm]` table. Absent keys keep the VM defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VmSection {
    pub addressing: Option<AddressingName>,
    pub audio: Option<bool>,
    pub recalc_audio: Option<bool>,
    pub clear_memory_on_load: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AddressingName {
    Full,
    Simple,
}

impl From<AddressingName> for Addressing {
    fn from(name: AddressingName) -> Self {
        match name {
            AddressingName::Full => Addressing::Full,
            AddressingName::Simple => Addressing::Simple,
        }
    }
}

impl VmSection {
    /// Overlay the keys present in the file onto `config`.
    pub fn apply(&self, mut config: VmConfig) -> VmConfig {
        if let Some(addressing) = self.addressing {
            config.addressing = addressing.into();
        }
        if let Some(audio) = self.audio {
            config.audio = audio;
        }
        if let Some(recalc) = self.recalc_audio {
            config.recalc_audio = recalc;
        }
        if let Some(clear) = self.clear_memory_on_load {
            config.clear_memory_on_load = clear;
        }
        config
    }
}

/// Load configuration from `path`, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    toml::from_str(&content).with_context(|| format!("cannot parse '{}'", path.display()))
}
