pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Counter configuration for the 8-bit window timer.
///
/// The counter runs from `preload` up to 256 at `cpu_hz / prescaler` and
/// raises its overflow flag when it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSetting {
    /// Clock divider; a power of two in `1..=16384`.
    pub prescaler: u16,
    /// Initial counter value.
    pub preload: u8,
}

impl TimerSetting {
    /// Counter ticks until overflow.
    #[inline]
    pub fn ticks(&self) -> u32 {
        256 - u32::from(self.preload)
    }

    /// CPU cycles until overflow.
    #[inline]
    pub fn cycles(&self) -> u64 {
        u64::from(self.ticks()) * u64::from(self.prescaler)
    }
}

pub trait IntervalTimer {
    fn arm(&mut self, setting: TimerSetting);
    fn overflowed(&self) -> bool;
    fn clear_overflow(&mut self);
    fn disarm(&mut self);
}

/// Differential ADC running in bipolar mode.
pub trait SamplingAdc {
    fn enable(&mut self);
    fn disable(&mut self);
    fn start_conversion(&mut self);
    fn conversion_busy(&self) -> bool;
    /// Raw 10-bit result (`ADCH:ADCL`), two's complement in bipolar mode.
    fn read_raw(&mut self) -> u16;
}

/// RC oscillator calibration register.
pub trait Oscillator {
    fn calibration(&self) -> u8;
    fn set_calibration(&mut self, value: u8);
}

/// Frame-length count measured when the CPU runs at `FRAME_REFERENCE_HZ`.
pub const FRAME_REFERENCE_TICKS: u64 = 1499;
pub const FRAME_REFERENCE_HZ: u64 = 10_500_000;

/// Frame-timing reference supplied by the USB transport.
///
/// The returned value is proportional to the actual CPU clock frequency:
/// `FRAME_REFERENCE_TICKS * f_cpu / FRAME_REFERENCE_HZ`.
pub trait FrameMeter {
    fn measure_frame_length(&mut self) -> u16;
}

pub trait InterruptControl {
    fn disable_interrupts(&mut self);
    fn enable_interrupts(&mut self);
}

/// Everything the device core needs from the microcontroller.
pub trait Board: IntervalTimer + SamplingAdc + Oscillator + FrameMeter + InterruptControl {}

impl<T> Board for T where
    T: IntervalTimer + SamplingAdc + Oscillator + FrameMeter + InterruptControl
{
}
