//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Keeps the file log writer alive; dropping the guard flushes it.
pub static FILE_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "sct", version, about = "Host tool for the sampling instrument")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when absent
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and logs as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send random values and check that the device echoes them back
    Testcomm {
        /// Number of echo round trips
        #[arg(long, default_value_t = 1000)]
        iterations: u32,
        /// Seed for the random payloads (random when absent)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the factory and the active oscillator calibration value
    Getosccal,
    /// Start an acquisition window
    Runadc,
    /// Print the average magnitude of the last window
    Getadc,
    /// Print the accumulated magnitude of the last window
    Getacc,
    /// Print the sample count of the last window
    Getcnt,
    /// Start a window, wait for it to close and print all three statistics
    Measure {
        /// Time to wait before reading the results
        #[arg(long, value_name = "MS", default_value_t = 250)]
        settle_ms: u64,
    },
    /// Quick health check of config, device build and calibration
    SelfCheck,
}
