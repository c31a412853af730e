//! Physical models behind the simulated board.

use std::f64::consts::TAU;
use std::time::Duration;

use sct_traits::{FRAME_REFERENCE_HZ, FRAME_REFERENCE_TICKS};

use crate::error::{HwError, Result};

/// RC oscillator with two overlapping frequency ranges.
///
/// Calibration values 0..=127 select the low range, 128..=255 the high range;
/// within a range the frequency grows by `step_hz` per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OscillatorModel {
    low_base_hz: u32,
    high_base_hz: u32,
    step_hz: u32,
}

impl Default for OscillatorModel {
    fn default() -> Self {
        Self {
            low_base_hz: 11_000_000,
            high_base_hz: 14_500_000,
            step_hz: 90_000,
        }
    }
}

impl OscillatorModel {
    pub fn new(low_base_hz: u32, high_base_hz: u32, step_hz: u32) -> Result<Self> {
        if low_base_hz == 0 || high_base_hz == 0 {
            return Err(HwError::Oscillator("base frequency must be > 0"));
        }
        if step_hz == 0 {
            return Err(HwError::Oscillator("step must be > 0"));
        }
        Ok(Self {
            low_base_hz,
            high_base_hz,
            step_hz,
        })
    }

    /// CPU clock produced by `osccal`.
    pub fn cpu_hz(&self, osccal: u8) -> u64 {
        let (base, offset) = if osccal < 128 {
            (self.low_base_hz, osccal)
        } else {
            (self.high_base_hz, osccal - 128)
        };
        u64::from(base) + u64::from(self.step_hz) * u64::from(offset)
    }

    /// Frame-length count the transport would measure at `osccal`.
    pub fn frame_length(&self, osccal: u8) -> u16 {
        let num = FRAME_REFERENCE_TICKS * self.cpu_hz(osccal);
        let q = (2 * num + FRAME_REFERENCE_HZ) / (2 * FRAME_REFERENCE_HZ);
        u16::try_from(q).unwrap_or(u16::MAX)
    }
}

/// Sine wave on the differential input, in ADC counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSource {
    amplitude_counts: u16,
    frequency_hz: f64,
    offset_counts: i16,
}

impl Default for SignalSource {
    fn default() -> Self {
        Self {
            amplitude_counts: 400,
            frequency_hz: 50.0,
            offset_counts: 0,
        }
    }
}

impl SignalSource {
    pub fn new(amplitude_counts: u16, frequency_hz: f64, offset_counts: i16) -> Result<Self> {
        if amplitude_counts > 512 {
            return Err(HwError::Signal("amplitude must be <= 512 counts"));
        }
        if !frequency_hz.is_finite() || frequency_hz < 0.0 {
            return Err(HwError::Signal("frequency must be finite and >= 0"));
        }
        Ok(Self {
            amplitude_counts,
            frequency_hz,
            offset_counts,
        })
    }

    /// Instantaneous reading at `t`, clamped to the ADC's input range.
    pub fn sample(&self, t: Duration) -> i32 {
        let phase = TAU * self.frequency_hz * t.as_secs_f64();
        let v = f64::from(self.offset_counts) + f64::from(self.amplitude_counts) * phase.sin();
        (v.round() as i32).clamp(-512, 511)
    }
}
