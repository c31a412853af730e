//! Configuration types for the device core.
//!
//! These are the runtime configuration structs used by `Device`.
//! They are separate from the TOML-deserialized config in `sct_config`.

use std::time::Duration;

use crate::util::DEFAULT_CPU_HZ;

/// Acquisition window configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowCfg {
    /// Length of one sampling window. Default: 200 ms (ten cycles at 50 Hz).
    pub interval: Duration,
}

impl Default for WindowCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
        }
    }
}

/// Device configuration fixed at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCfg {
    /// Nominal CPU clock the oscillator is calibrated towards.
    pub cpu_hz: u32,
    pub window: WindowCfg,
}

impl Default for DeviceCfg {
    fn default() -> Self {
        Self {
            cpu_hz: DEFAULT_CPU_HZ,
            window: WindowCfg::default(),
        }
    }
}
