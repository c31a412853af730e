//! `From` implementations bridging `sct_config` types to `sct_core` types.

use std::time::Duration;

use crate::config::{DeviceCfg, WindowCfg};

impl From<&sct_config::WindowCfg> for WindowCfg {
    fn from(c: &sct_config::WindowCfg) -> Self {
        Self {
            interval: Duration::from_millis(c.interval_ms),
        }
    }
}

impl From<&sct_config::Config> for DeviceCfg {
    fn from(c: &sct_config::Config) -> Self {
        Self {
            cpu_hz: c.device.cpu_hz,
            window: WindowCfg::from(&c.window),
        }
    }
}
