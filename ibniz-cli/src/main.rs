//! IBNIZ CLI: disassemble, evaluate and render programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input, configuration or output error
//! - 2: Usage error

mod commands;
mod config;

use clap::{Args, Parser, Subcommand};
use config::AddressingName;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "ibniz", version, about = "IBNIZ virtual machine")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with a [vm] table.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the instruction listing and the calibrated layout.
    Disasm {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        vm: VmFlags,
    },
    /// Evaluate one sample and print the video and audio words.
    Eval {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        vm: VmFlags,
        #[arg(long, default_value_t = 0)]
        x: u8,
        #[arg(long, default_value_t = 0)]
        y: u8,
        #[arg(long, default_value_t = 0)]
        t: u32,
    },
    /// Render 256x256 frames of little-endian video words.
    Frame {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        vm: VmFlags,
        /// Time of the first frame.
        #[arg(long, default_value_t = 0)]
        t: u32,
        #[arg(long, default_value_t = 1)]
        frames: u32,
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
        /// Write one 16-bit PCM sample per row here.
        #[arg(long, value_name = "FILE")]
        audio_out: Option<PathBuf>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Program file.
    file: Option<PathBuf>,
    /// Program text.
    #[arg(short = 'e', long = "code", value_name = "CODE")]
    code: Option<String>,
}

/// VM settings; each one given here overrides the config file.
///
/// Switches take an optional value: `--audio` turns audio on and
/// `--audio=false` turns it off.
#[derive(Args)]
struct VmFlags {
    #[arg(long, value_enum)]
    addressing: Option<AddressingName>,
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    audio: Option<bool>,
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    recalc_audio: Option<bool>,
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    clear_memory: Option<bool>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
