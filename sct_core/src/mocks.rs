//! Test and helper mocks for sct_core.

use std::collections::VecDeque;

use sct_traits::{
    FrameMeter, InterruptControl, IntervalTimer, Oscillator, SamplingAdc, TimerSetting,
};

/// Frame length as a function of the oscillator calibration value.
pub type FrameModel = Box<dyn Fn(u8) -> u16>;

/// A board whose peripherals are driven by hand.
///
/// The timer never expires on its own: call `expire()` (or set `overflow`).
/// Conversions complete immediately unless `busy` is set; `read_raw` pops
/// from `samples` and returns 0 once it runs dry.
pub struct ScriptedBoard {
    pub armed: Option<TimerSetting>,
    pub overflow: bool,
    pub adc_enabled: bool,
    pub busy: bool,
    pub samples: VecDeque<u16>,
    pub conversions_started: u32,
    pub osccal: u8,
    pub frame_model: FrameModel,
    pub interrupts_enabled: bool,
    pub interrupt_disables: u32,
    /// Frame measurements taken while interrupts were enabled.
    pub unguarded_measurements: u32,
    pub calibration_writes: Vec<u8>,
}

impl ScriptedBoard {
    /// Board with the given power-up calibration value and a linear
    /// frame model that hits 2356 exactly at value 61 (and at 189).
    pub fn new(osccal: u8) -> Self {
        Self {
            armed: None,
            overflow: false,
            adc_enabled: false,
            busy: false,
            samples: VecDeque::new(),
            conversions_started: 0,
            osccal,
            frame_model: Box::new(|v| 1563 + 13 * u16::from(v % 128)),
            interrupts_enabled: true,
            interrupt_disables: 0,
            unguarded_measurements: 0,
            calibration_writes: Vec::new(),
        }
    }

    pub fn with_frame_model(mut self, f: impl Fn(u8) -> u16 + 'static) -> Self {
        self.frame_model = Box::new(f);
        self
    }

    pub fn with_samples(mut self, raw: impl IntoIterator<Item = u16>) -> Self {
        self.samples.extend(raw);
        self
    }

    /// Raise the timer overflow flag if the timer is armed.
    pub fn expire(&mut self) {
        if self.armed.is_some() {
            self.overflow = true;
        }
    }
}

impl IntervalTimer for ScriptedBoard {
    fn arm(&mut self, setting: TimerSetting) {
        self.armed = Some(setting);
    }

    fn overflowed(&self) -> bool {
        self.overflow
    }

    fn clear_overflow(&mut self) {
        self.overflow = false;
    }

    fn disarm(&mut self) {
        self.armed = None;
    }
}

impl SamplingAdc for ScriptedBoard {
    fn enable(&mut self) {
        self.adc_enabled = true;
    }

    fn disable(&mut self) {
        self.adc_enabled = false;
    }

    fn start_conversion(&mut self) {
        self.conversions_started += 1;
    }

    fn conversion_busy(&self) -> bool {
        self.busy
    }

    fn read_raw(&mut self) -> u16 {
        self.samples.pop_front().unwrap_or(0)
    }
}

impl Oscillator for ScriptedBoard {
    fn calibration(&self) -> u8 {
        self.osccal
    }

    fn set_calibration(&mut self, value: u8) {
        self.osccal = value;
        self.calibration_writes.push(value);
    }
}

impl FrameMeter for ScriptedBoard {
    fn measure_frame_length(&mut self) -> u16 {
        if self.interrupts_enabled {
            self.unguarded_measurements += 1;
        }
        (self.frame_model)(self.osccal)
    }
}

impl InterruptControl for ScriptedBoard {
    fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
        self.interrupt_disables += 1;
    }

    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }
}
