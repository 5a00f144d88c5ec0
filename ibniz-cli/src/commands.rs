//! CLI command implementations.

use crate::config::load_config;
use crate::{Cli, Command, SourceArgs, VmFlags};
use anyhow::{bail, Context, Result};
use ibniz_common::word::format_literal;
use ibniz_parser::listing;
use ibniz_vm::{Layout, Sample, VmConfig, VM};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Side length of a rendered frame.
const FRAME_SIDE: u32 = 256;

/// Run the selected command with the merged VM settings.
pub fn dispatch(cli: Cli) -> Result<()> {
    let file_config = load_config(cli.config.as_deref())?;
    let config_for = |flags: &VmFlags| flags.apply(file_config.vm.apply(VmConfig::default()));

    match cli.command {
        Command::Disasm { source, vm } => disasm(&read_source(&source)?, config_for(&vm)),
        Command::Eval {
            source,
            vm,
            x,
            y,
            t,
        } => eval(&read_source(&source)?, config_for(&vm), x, y, t),
        Command::Frame {
            source,
            vm,
            t,
            frames,
            out,
            audio_out,
        } => frame(
            &read_source(&source)?,
            config_for(&vm),
            t,
            frames,
            &out,
            audio_out.as_deref(),
        ),
    }
}

impl VmFlags {
    fn apply(&self, mut config: VmConfig) -> VmConfig {
        if let Some(addressing) = self.addressing {
            config.addressing = addressing.into();
        }
        if let Some(audio) = self.audio {
            config.audio = audio;
        }
        if let Some(recalc) = self.recalc_audio {
            config.recalc_audio = recalc;
        }
        if let Some(clear) = self.clear_memory {
            config.clear_memory_on_load = clear;
        }
        config
    }
}

fn read_source(args: &SourceArgs) -> Result<String> {
    match (&args.code, &args.file) {
        (Some(code), _) => Ok(code.clone()),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path.display()))
        }
        (None, None) => bail!("no program given"),
    }
}

fn layout_name(layout: Layout) -> &'static str {
    match layout {
        Layout::Packed => "packed",
        Layout::Tuple => "tuple",
    }
}

/// Print the listing followed by the calibrated layout.
fn disasm(source: &str, config: VmConfig) -> Result<()> {
    let vm = VM::with_source(source, config);
    print!("{}", listing(vm.program()));
    println!(
        "; {} instructions, {} blocks, layout {}",
        vm.program().len(),
        vm.compiled().block_count(),
        layout_name(vm.layout())
    );
    Ok(())
}

/// Evaluate one sample.
fn eval(source: &str, config: VmConfig, x: u8, y: u8, t: u32) -> Result<()> {
    let mut vm = VM::with_source(source, config);
    vm.set_time(t);
    let sample = vm.run(x, y);
    print_sample(&sample);
    if let Some(fault) = vm.last_fault() {
        println!("fault  {fault}");
    }
    Ok(())
}

fn print_sample(sample: &Sample) {
    println!(
        "video  {:#010x}  {:<11} v={:02x} u={:02x} y={:02x}",
        sample.video as u32,
        format_literal(sample.video),
        sample.chroma_v(),
        sample.chroma_u(),
        sample.luma()
    );
    println!(
        "audio  {:#010x}  {:<11} pcm={}",
        sample.audio as u32,
        format_literal(sample.audio),
        sample.audio_pcm()
    );
}

/// Render `frames` frames starting at time `t`.
fn frame(
    source: &str,
    config: VmConfig,
    t: u32,
    frames: u32,
    out: &Path,
    audio_out: Option<&Path>,
) -> Result<()> {
    let mut vm = VM::with_source(source, config);
    let mut video = BufWriter::new(create(out)?);
    let mut audio = audio_out.map(create).transpose()?.map(BufWriter::new);

    for n in 0..frames {
        let time = t.wrapping_add(n);
        vm.set_time(time);
        for y in 0..FRAME_SIDE {
            for x in 0..FRAME_SIDE {
                let sample = vm.run(x as u8, y as u8);
                video.write_all(&(sample.video as u32).to_le_bytes())?;
                if x == 0 {
                    if let Some(audio) = audio.as_mut() {
                        audio.write_all(&sample.audio_pcm().to_le_bytes())?;
                    }
                }
            }
        }
        debug!(frame = n, time, fault = ?vm.last_fault(), "rendered frame");
    }

    video
        .flush()
        .with_context(|| format!("cannot write '{}'", out.display()))?;
    if let (Some(mut audio), Some(path)) = (audio, audio_out) {
        audio
            .flush()
            .with_context(|| format!("cannot write '{}'", path.display()))?;
    }

    eprintln!("rendered {frames} frames -> {}", out.display());
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("cannot create '{}'", path.display()))
}
