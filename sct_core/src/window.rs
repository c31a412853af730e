//! Acquisition window: one timed sampling interval and its statistics.
//!
//! The window is reset only by `WindowController::start` and frozen by
//! `WindowController::poll` once the timer overflows. Between the two only
//! the sample accumulator writes to it; everything else reads.

use sct_traits::{IntervalTimer, SamplingAdc, TimerSetting};

use crate::util::div_round_nearest_u32;

/// Mask applied to the accumulated sum when it is reported (24-bit wire value).
pub const SUM_MASK: u32 = 0x00FF_FFFF;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionWindow {
    running: bool,
    sample_count: u16,
    accumulated_sum: u32,
    sample_pending: bool,
}

impl AcquisitionWindow {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sample_count(&self) -> u16 {
        self.sample_count
    }

    pub fn accumulated_sum(&self) -> u32 {
        self.accumulated_sum
    }

    pub fn is_sample_pending(&self) -> bool {
        self.sample_pending
    }

    /// Mean magnitude of a frozen window, rounded half-up.
    /// `None` while the window runs or when it holds no samples.
    pub fn average(&self) -> Option<u16> {
        if self.running || self.sample_count == 0 {
            return None;
        }
        let avg = div_round_nearest_u32(self.accumulated_sum, u32::from(self.sample_count));
        Some(u16::try_from(avg).unwrap_or(u16::MAX))
    }

    fn reset(&mut self) {
        self.sample_count = 0;
        self.accumulated_sum = 0;
        self.sample_pending = false;
    }

    pub(crate) fn mark_pending(&mut self) {
        self.sample_pending = true;
    }

    /// Add one magnitude sample and clear the pending flag.
    ///
    /// Wraps instead of panicking; the sum is sized for a full window at the
    /// fastest conversion rate.
    pub(crate) fn record(&mut self, magnitude: u16) {
        self.accumulated_sum = self.accumulated_sum.wrapping_add(u32::from(magnitude));
        self.sample_count = self.sample_count.wrapping_add(1);
        self.sample_pending = false;
    }
}

/// Starts and expires acquisition windows on the interval timer.
#[derive(Debug, Clone, Copy)]
pub struct WindowController {
    setting: TimerSetting,
}

impl WindowController {
    pub fn new(setting: TimerSetting) -> Self {
        Self { setting }
    }

    pub fn setting(&self) -> TimerSetting {
        self.setting
    }

    /// Begin a new window unless one is already running.
    ///
    /// Returns `false` when the call was ignored, so duplicate host commands
    /// never reset a window in progress.
    pub fn start<B>(&self, window: &mut AcquisitionWindow, board: &mut B) -> bool
    where
        B: IntervalTimer + SamplingAdc + ?Sized,
    {
        if window.running {
            tracing::trace!("start ignored, window already running");
            return false;
        }
        board.arm(self.setting);
        if board.overflowed() {
            board.clear_overflow();
        }
        window.running = true;
        board.enable();
        window.reset();
        tracing::debug!(
            prescaler = self.setting.prescaler,
            preload = self.setting.preload,
            "acquisition window started"
        );
        true
    }

    /// Freeze the window once the timer has overflowed.
    ///
    /// Returns `true` on the iteration that closed the window.
    pub fn poll<B>(&self, window: &mut AcquisitionWindow, board: &mut B) -> bool
    where
        B: IntervalTimer + SamplingAdc + ?Sized,
    {
        if !board.overflowed() {
            return false;
        }
        board.clear_overflow();
        window.running = false;
        board.disable();
        board.disarm();
        tracing::debug!(
            samples = window.sample_count,
            sum = window.accumulated_sum,
            "acquisition window closed"
        );
        true
    }
}
