//! Clock, timer and rounding helpers for sct_core.

use std::time::Duration;

pub use sct_traits::{FRAME_REFERENCE_HZ, FRAME_REFERENCE_TICKS};
use sct_traits::TimerSetting;

/// Nominal CPU clock: 16.5 MHz derived from the calibrated RC oscillator.
pub const DEFAULT_CPU_HZ: u32 = 16_500_000;
/// Largest divider of the 8-bit window timer.
pub const MAX_PRESCALER: u16 = 16_384;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Frame-length count that corresponds to running exactly at `cpu_hz`.
///
/// `round(1499 * cpu_hz / 10.5 MHz)`, saturating at `u16::MAX`.
/// At 16.5 MHz this is 2356.
#[inline]
pub const fn target_reference(cpu_hz: u32) -> u16 {
    let num = FRAME_REFERENCE_TICKS * cpu_hz as u64;
    let q = (2 * num + FRAME_REFERENCE_HZ) / (2 * FRAME_REFERENCE_HZ);
    if q > u16::MAX as u64 {
        u16::MAX
    } else {
        q as u16
    }
}

/// Pick the smallest prescaler for which `interval` fits in the 8-bit
/// counter, and the preload that makes the counter overflow after it.
///
/// Returns `None` for a zero interval or one longer than
/// `256 * MAX_PRESCALER` cycles.
pub fn timer_setting_for(interval: Duration, cpu_hz: u32) -> Option<TimerSetting> {
    if cpu_hz == 0 {
        return None;
    }
    let cycles = (interval.as_nanos() * u128::from(cpu_hz) + NANOS_PER_SEC / 2) / NANOS_PER_SEC;
    let mut prescaler: u16 = 1;
    loop {
        let p = u128::from(prescaler);
        let ticks = (cycles + p / 2) / p;
        if ticks == 0 {
            return None;
        }
        if ticks <= 256 {
            return Some(TimerSetting {
                prescaler,
                preload: (256 - ticks) as u8,
            });
        }
        if prescaler >= MAX_PRESCALER {
            return None;
        }
        prescaler <<= 1;
    }
}

/// Integer division rounded half-up: `floor(n / d + 0.5)`.
/// Returns 0 when `d == 0`.
#[inline]
pub fn div_round_nearest_u32(n: u32, d: u32) -> u32 {
    if d == 0 {
        return 0;
    }
    let n = u64::from(n);
    let d = u64::from(d);
    ((n + d / 2) / d) as u32
}
