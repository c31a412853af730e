//! RC oscillator self-calibration against the USB frame-timing reference.
//!
//! Runs once per bus reset with interrupts disabled (the frame measurement
//! counts CPU cycles). The search is a fixed seven-step binary search over
//! one half of the calibration register, followed by a three-point
//! neighbourhood refinement. No retries: a noisy reference simply yields a
//! less accurate value.

use sct_traits::{FrameMeter, Oscillator};

/// Current values below this search the low range.
pub const LOW_RANGE_LIMIT: u8 = 116;
/// Start of the high oscillator range.
pub const HIGH_RANGE_START: u8 = 128;
/// Current values below this (and at or above 128) search the low range.
pub const HIGH_RANGE_LIMIT: u8 = 140;
pub const INITIAL_STEP: u8 = 64;

/// Pick the half of the register to search from the current value.
///
/// The two oscillator ranges overlap, so values just below 128 are very high
/// for the low range and values just above it very low for the high range;
/// those search the opposite range.
pub fn search_start(current: u8) -> u8 {
    if current < LOW_RANGE_LIMIT {
        0
    } else if current < HIGH_RANGE_START {
        HIGH_RANGE_START
    } else if current < HIGH_RANGE_LIMIT {
        0
    } else {
        HIGH_RANGE_START
    }
}

/// Result of one calibration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationOutcome {
    /// First value of the searched range.
    pub start: u8,
    /// Binary search result, within one unit of the optimum.
    pub searched: u8,
    /// Value committed to the oscillator.
    pub chosen: u8,
    /// `|frame_length - target_reference|` at `chosen`.
    pub deviation: i32,
    /// Frame measurements taken.
    pub measurements: u8,
}

/// Transient state of one calibration pass.
#[derive(Debug, Clone)]
pub struct CalibrationRun {
    trial_value: u8,
    step: u8,
    target_reference: u16,
    best_value: u8,
    best_deviation: i32,
    measurements: u8,
}

impl CalibrationRun {
    pub fn new(current: u8, target_reference: u16) -> Self {
        let start = search_start(current);
        Self {
            trial_value: start,
            step: INITIAL_STEP,
            target_reference,
            best_value: start,
            best_deviation: i32::MAX,
            measurements: 0,
        }
    }

    fn measure<B>(&mut self, board: &mut B, value: u8) -> u16
    where
        B: Oscillator + FrameMeter + ?Sized,
    {
        board.set_calibration(value);
        self.measurements = self.measurements.saturating_add(1);
        board.measure_frame_length()
    }

    /// Run the search on `board` and leave the best value applied.
    pub fn execute<B>(mut self, board: &mut B) -> CalibrationOutcome
    where
        B: Oscillator + FrameMeter + ?Sized,
    {
        let start = self.trial_value;
        while self.step > 0 {
            let probe = self.trial_value.saturating_add(self.step);
            let x = self.measure(board, probe);
            // clock still too slow: keep the increment
            if x < self.target_reference {
                self.trial_value = probe;
            }
            self.step >>= 1;
        }
        let searched = self.trial_value;

        let neighbourhood = [
            searched.saturating_sub(1),
            searched,
            searched.saturating_add(1),
        ];
        for candidate in neighbourhood {
            let x = self.measure(board, candidate);
            let deviation = (i32::from(x) - i32::from(self.target_reference)).abs();
            if deviation < self.best_deviation {
                self.best_deviation = deviation;
                self.best_value = candidate;
            }
        }
        board.set_calibration(self.best_value);

        CalibrationOutcome {
            start,
            searched,
            chosen: self.best_value,
            deviation: self.best_deviation,
            measurements: self.measurements,
        }
    }
}

/// Calibrate the oscillator on `board` towards `target_reference`.
///
/// The caller is responsible for keeping interrupts disabled for the
/// duration; see `critical::InterruptFree`.
pub fn calibrate<B>(board: &mut B, target_reference: u16) -> CalibrationOutcome
where
    B: Oscillator + FrameMeter + ?Sized,
{
    CalibrationRun::new(board.calibration(), target_reference).execute(board)
}
