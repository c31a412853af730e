//! Sample accumulation for the running acquisition window.

use sct_traits::SamplingAdc;

use crate::window::AcquisitionWindow;

/// Sign bit of a 10-bit bipolar conversion result.
pub const SIGN_BIT: u16 = 0x200;
/// Magnitude of the most negative bipolar reading.
pub const FULL_SCALE: u16 = 512;

/// Convert a raw bipolar (two's complement, 10-bit) reading into an unsigned
/// magnitude in `0..=512`.
///
/// Bits above bit 9 are ignored.
#[inline]
pub fn magnitude_from_raw(raw: u16) -> u16 {
    let raw = raw & 0x3FF;
    if raw & SIGN_BIT != 0 {
        FULL_SCALE - (raw & (SIGN_BIT - 1))
    } else {
        raw
    }
}

/// Drives one conversion at a time while the window is running.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleAccumulator;

impl SampleAccumulator {
    pub fn new() -> Self {
        Self
    }

    /// Start a conversion when none is pending, and fold a completed one
    /// into the window. Does nothing while the window is frozen.
    pub fn poll<A>(&self, window: &mut AcquisitionWindow, adc: &mut A)
    where
        A: SamplingAdc + ?Sized,
    {
        if !window.is_running() {
            return;
        }
        if !window.is_sample_pending() {
            window.mark_pending();
            adc.start_conversion();
        }
        if window.is_sample_pending() && !adc.conversion_busy() {
            let raw = adc.read_raw();
            let magnitude = magnitude_from_raw(raw);
            window.record(magnitude);
            tracing::trace!(raw, magnitude, "sample");
        }
    }
}
