//! Simulated microcontroller board.
//!
//! Every peripheral runs on the injected `Clock`: the window timer expires at
//! a deadline computed from the oscillator frequency, conversions take
//! 13 ADC clocks at CPU/128, and each frame measurement waits one 1 ms frame.
//! With a `ManualClock` the whole board is deterministic.

use std::time::{Duration, Instant};

use sct_traits::{
    Clock, FrameMeter, InterruptControl, IntervalTimer, ManualClock, Oscillator, SamplingAdc,
    TimerSetting,
};

use crate::model::{OscillatorModel, SignalSource};
use crate::util::{cycles_to_duration, encode_bipolar};

/// CPU cycles per ADC conversion (13 ADC clocks at a /128 prescaler).
pub const CONVERSION_CYCLES: u64 = 13 * 128;
/// USB full-speed frame period.
pub const FRAME_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy)]
struct Countdown {
    setting: TimerSetting,
    deadline: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Conversion {
    ready_at: Instant,
    raw: u16,
}

pub struct SimBoard<C: Clock = ManualClock> {
    clock: C,
    epoch: Instant,
    oscillator: OscillatorModel,
    signal: SignalSource,
    osccal: u8,
    timer: Option<Countdown>,
    adc_enabled: bool,
    conversion: Option<Conversion>,
    last_raw: u16,
    interrupts_enabled: bool,
    unguarded_frames: u32,
}

impl<C: Clock> SimBoard<C> {
    /// Board powered up with `factory_calibration` in the oscillator register.
    pub fn new(clock: C, factory_calibration: u8) -> Self {
        let epoch = clock.now();
        Self {
            clock,
            epoch,
            oscillator: OscillatorModel::default(),
            signal: SignalSource::default(),
            osccal: factory_calibration,
            timer: None,
            adc_enabled: false,
            conversion: None,
            last_raw: 0,
            interrupts_enabled: true,
            unguarded_frames: 0,
        }
    }

    pub fn with_oscillator(mut self, oscillator: OscillatorModel) -> Self {
        self.oscillator = oscillator;
        self
    }

    pub fn with_signal(mut self, signal: SignalSource) -> Self {
        self.signal = signal;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn oscillator(&self) -> &OscillatorModel {
        &self.oscillator
    }

    /// Clock currently produced by the oscillator.
    pub fn cpu_hz(&self) -> u64 {
        self.oscillator.cpu_hz(self.osccal)
    }

    pub fn is_adc_enabled(&self) -> bool {
        self.adc_enabled
    }

    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    /// Frame measurements taken with interrupts enabled.
    pub fn unguarded_frames(&self) -> u32 {
        self.unguarded_frames
    }

    fn cycles(&self, cycles: u64) -> Duration {
        cycles_to_duration(cycles, self.cpu_hz())
    }
}

impl<C: Clock> IntervalTimer for SimBoard<C> {
    fn arm(&mut self, setting: TimerSetting) {
        let deadline = self.clock.now() + self.cycles(setting.cycles());
        self.timer = Some(Countdown { setting, deadline });
    }

    fn overflowed(&self) -> bool {
        self.timer.is_some_and(|t| self.clock.now() >= t.deadline)
    }

    fn clear_overflow(&mut self) {
        let now = self.clock.now();
        // after wrapping the counter runs a full 256 ticks
        let period = self.cycles(256 * u64::from(self.timer.map_or(1, |t| t.setting.prescaler)));
        if let Some(t) = self.timer.as_mut() {
            if now >= t.deadline {
                t.deadline += period;
            }
        }
    }

    fn disarm(&mut self) {
        self.timer = None;
    }
}

impl<C: Clock> SamplingAdc for SimBoard<C> {
    fn enable(&mut self) {
        self.adc_enabled = true;
    }

    fn disable(&mut self) {
        self.adc_enabled = false;
        self.conversion = None;
    }

    fn start_conversion(&mut self) {
        if !self.adc_enabled {
            tracing::warn!("conversion started with ADC disabled");
            return;
        }
        let now = self.clock.now();
        let v = self.signal.sample(now.saturating_duration_since(self.epoch));
        self.conversion = Some(Conversion {
            ready_at: now + self.cycles(CONVERSION_CYCLES),
            raw: encode_bipolar(v),
        });
    }

    fn conversion_busy(&self) -> bool {
        self.conversion.is_some_and(|c| self.clock.now() < c.ready_at)
    }

    fn read_raw(&mut self) -> u16 {
        if let Some(c) = self.conversion.take() {
            self.last_raw = c.raw;
        }
        self.last_raw
    }
}

impl<C: Clock> Oscillator for SimBoard<C> {
    fn calibration(&self) -> u8 {
        self.osccal
    }

    fn set_calibration(&mut self, value: u8) {
        self.osccal = value;
    }
}

impl<C: Clock> FrameMeter for SimBoard<C> {
    fn measure_frame_length(&mut self) -> u16 {
        if self.interrupts_enabled {
            self.unguarded_frames += 1;
            tracing::warn!("frame measured with interrupts enabled");
        }
        self.clock.sleep(FRAME_PERIOD);
        self.oscillator.frame_length(self.osccal)
    }
}

impl<C: Clock> InterruptControl for SimBoard<C> {
    fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
    }

    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }
}
