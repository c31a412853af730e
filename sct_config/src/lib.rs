#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the instrument and its simulated hardware.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Every section has defaults, so an empty file is a valid config.
use std::path::Path;

use eyre::WrapErr;
use serde::Deserialize;

/// Largest timer divider; mirrors the 8-bit window timer.
const MAX_PRESCALER: u64 = 16_384;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeviceCfg {
    /// Nominal CPU clock the oscillator is calibrated towards (Hz)
    pub cpu_hz: u32,
    /// Oscillator calibration value the simulated part powers up with
    pub factory_calibration: u8,
}

impl Default for DeviceCfg {
    fn default() -> Self {
        Self {
            cpu_hz: 16_500_000,
            factory_calibration: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WindowCfg {
    /// Acquisition window length in milliseconds
    pub interval_ms: u64,
}

impl Default for WindowCfg {
    fn default() -> Self {
        Self { interval_ms: 200 }
    }
}

/// Two-range RC oscillator model used by the simulator.
///
/// Values 0..=127 run at `low_base_hz + step_hz * v`,
/// values 128..=255 at `high_base_hz + step_hz * (v - 128)`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OscillatorCfg {
    pub low_base_hz: u32,
    pub high_base_hz: u32,
    pub step_hz: u32,
}

impl Default for OscillatorCfg {
    fn default() -> Self {
        Self {
            low_base_hz: 11_000_000,
            high_base_hz: 14_500_000,
            step_hz: 90_000,
        }
    }
}

/// Sine source on the differential input, in ADC counts.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SignalCfg {
    pub amplitude_counts: u16,
    pub frequency_hz: f64,
    pub offset_counts: i16,
}

impl Default for SignalCfg {
    fn default() -> Self {
        Self {
            amplitude_counts: 400,
            frequency_hz: 50.0,
            offset_counts: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationCfg {
    /// Simulated time per device main-loop iteration (us)
    pub loop_period_us: u64,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            loop_period_us: 100,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub device: DeviceCfg,
    pub window: WindowCfg,
    pub oscillator: OscillatorCfg,
    pub signal: SignalCfg,
    pub simulation: SimulationCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. Does not validate.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let s = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    load_toml(&s).wrap_err_with(|| format!("parse config {}", path.display()))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Device
        if self.device.cpu_hz == 0 {
            eyre::bail!("device.cpu_hz must be > 0");
        }

        // Window
        if self.window.interval_ms == 0 {
            eyre::bail!("window.interval_ms must be > 0");
        }
        let max_ms = 256 * MAX_PRESCALER * 1000 / u64::from(self.device.cpu_hz);
        if self.window.interval_ms > max_ms {
            eyre::bail!(
                "window.interval_ms must be <= {} at device.cpu_hz = {}",
                max_ms,
                self.device.cpu_hz
            );
        }

        // Oscillator
        if self.oscillator.low_base_hz == 0 {
            eyre::bail!("oscillator.low_base_hz must be > 0");
        }
        if self.oscillator.high_base_hz == 0 {
            eyre::bail!("oscillator.high_base_hz must be > 0");
        }
        if self.oscillator.step_hz == 0 {
            eyre::bail!("oscillator.step_hz must be > 0");
        }

        // Signal
        if self.signal.amplitude_counts > 512 {
            eyre::bail!("signal.amplitude_counts must be <= 512");
        }
        if !self.signal.frequency_hz.is_finite() || self.signal.frequency_hz < 0.0 {
            eyre::bail!("signal.frequency_hz must be finite and >= 0");
        }
        if !(-512..=511).contains(&self.signal.offset_counts) {
            eyre::bail!("signal.offset_counts must be in -512..=511");
        }

        // Simulation
        if self.simulation.loop_period_us == 0 {
            eyre::bail!("simulation.loop_period_us must be > 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref() {
            if !matches!(rot, "never" | "daily" | "hourly") {
                eyre::bail!("logging.rotation must be one of: never, daily, hourly");
            }
        }
        Ok(())
    }
}
