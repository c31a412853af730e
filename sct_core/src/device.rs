//! The device: every component composed over one owned board.

use std::marker::PhantomData;
use std::time::Duration;

use sct_traits::Board;

use crate::accumulator::SampleAccumulator;
use crate::calibration::{CalibrationOutcome, calibrate};
use crate::config::DeviceCfg;
use crate::critical::InterruptFree;
use crate::error::{BuildError, Result};
use crate::hid::{HidKeyboard, KeyReport};
use crate::util::{target_reference, timer_setting_for};
use crate::window::{AcquisitionWindow, WindowController};

/// Instrument core. Owns the board; the transport calls in through
/// `on_reset`, `poll`, `handle_setup` and `next_interrupt_report`.
pub struct Device<B: Board> {
    pub(crate) board: B,
    pub(crate) window: AcquisitionWindow,
    pub(crate) controller: WindowController,
    pub(crate) accumulator: SampleAccumulator,
    pub(crate) keyboard: HidKeyboard,
    pub(crate) factory_calibration: u8,
    pub(crate) target_reference: u16,
    pub(crate) last_calibration: Option<CalibrationOutcome>,
}

impl<B: Board> Device<B> {
    pub fn builder() -> DeviceBuilder<B, Missing> {
        DeviceBuilder::default()
    }

    /// Bus reset: recalibrate the oscillator with interrupts held off.
    pub fn on_reset(&mut self) -> CalibrationOutcome {
        let outcome = {
            let mut guard = InterruptFree::enter(&mut self.board);
            calibrate(&mut *guard, self.target_reference)
        };
        self.last_calibration = Some(outcome);
        tracing::info!(
            factory = self.factory_calibration,
            chosen = outcome.chosen,
            deviation = outcome.deviation,
            target = self.target_reference,
            "oscillator calibrated"
        );
        outcome
    }

    /// One main-loop iteration: expire the window, then service the ADC.
    ///
    /// Returns `true` on the iteration that closed a window.
    pub fn poll(&mut self) -> bool {
        let closed = self.controller.poll(&mut self.window, &mut self.board);
        self.accumulator.poll(&mut self.window, &mut self.board);
        closed
    }

    /// Next keyboard report for the interrupt endpoint, if any.
    pub fn next_interrupt_report(&mut self, endpoint_ready: bool) -> Option<KeyReport> {
        self.keyboard.poll(endpoint_ready)
    }

    pub fn window(&self) -> &AcquisitionWindow {
        &self.window
    }

    pub fn keyboard(&self) -> &HidKeyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut HidKeyboard {
        &mut self.keyboard
    }

    /// Calibration value read from the oscillator when the device was built.
    pub fn factory_calibration(&self) -> u8 {
        self.factory_calibration
    }

    pub fn active_calibration(&self) -> u8 {
        self.board.calibration()
    }

    pub fn target_reference(&self) -> u16 {
        self.target_reference
    }

    pub fn last_calibration(&self) -> Option<CalibrationOutcome> {
        self.last_calibration
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn into_board(self) -> B {
        self.board
    }
}

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

/// Builder for `Device`. The board is mandatory; `build()` only exists once
/// it is set, `try_build()` reports what is missing.
pub struct DeviceBuilder<B, S> {
    board: Option<B>,
    cfg: DeviceCfg,
    _s: PhantomData<S>,
}

impl<B> Default for DeviceBuilder<B, Missing> {
    fn default() -> Self {
        Self {
            board: None,
            cfg: DeviceCfg::default(),
            _s: PhantomData,
        }
    }
}

impl<B: Board> DeviceBuilder<B, Missing> {
    pub fn with_board(self, board: B) -> DeviceBuilder<B, Set> {
        DeviceBuilder {
            board: Some(board),
            cfg: self.cfg,
            _s: PhantomData,
        }
    }
}

impl<B: Board, S> DeviceBuilder<B, S> {
    pub fn with_config(mut self, cfg: DeviceCfg) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn with_cpu_hz(mut self, cpu_hz: u32) -> Self {
        self.cfg.cpu_hz = cpu_hz;
        self
    }

    pub fn with_window_interval(mut self, interval: Duration) -> Self {
        self.cfg.window.interval = interval;
        self
    }

    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<Device<B>> {
        let DeviceBuilder { board, cfg, _s: _ } = self;
        let board = board.ok_or_else(|| eyre::Report::new(BuildError::MissingBoard))?;

        if cfg.cpu_hz == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "cpu_hz must be > 0",
            )));
        }
        let setting = timer_setting_for(cfg.window.interval, cfg.cpu_hz).ok_or_else(|| {
            eyre::Report::new(BuildError::InvalidConfig(
                "window interval cannot be expressed by the timer",
            ))
        })?;

        let factory_calibration = board.calibration();
        let target = target_reference(cfg.cpu_hz);
        tracing::debug!(
            cpu_hz = cfg.cpu_hz,
            interval_ms = u64::try_from(cfg.window.interval.as_millis()).unwrap_or(u64::MAX),
            prescaler = setting.prescaler,
            preload = setting.preload,
            target,
            factory_calibration,
            "device built"
        );

        Ok(Device {
            board,
            window: AcquisitionWindow::default(),
            controller: WindowController::new(setting),
            accumulator: SampleAccumulator::new(),
            keyboard: HidKeyboard::new(),
            factory_calibration,
            target_reference: target,
            last_calibration: None,
        })
    }
}

impl<B: Board> DeviceBuilder<B, Set> {
    /// Validate and build the device.
    pub fn build(self) -> Result<Device<B>> {
        self.try_build()
    }
}
