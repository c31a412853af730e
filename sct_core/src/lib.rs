#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Instrument core (hardware-agnostic).
//!
//! All peripheral access goes through the `sct_traits` hardware traits; the
//! `Device` owns one board and is driven by the transport from a single
//! thread.
//!
//! ## Architecture
//!
//! - **Window**: timer-bounded acquisition interval (`window` module)
//! - **Accumulator**: bipolar ADC readings folded into sum and count
//! - **Calibration**: oscillator search against the USB frame reference
//! - **Dispatcher**: vendor command protocol (`dispatcher` module)
//! - **HID**: keyboard class requests and the dormant key-event machine
//!
//! ## Reported values
//!
//! The accumulated sum is kept in a `u32` and reported as 24 bits. The
//! average is rounded half-up and reads 0 until a window has closed with at
//! least one sample.

pub mod accumulator;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod critical;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod hid;
pub mod mocks;
pub mod util;
pub mod window;

pub use accumulator::{SampleAccumulator, magnitude_from_raw};
pub use calibration::{CalibrationOutcome, CalibrationRun, calibrate, search_start};
pub use config::{DeviceCfg, WindowCfg};
pub use critical::InterruptFree;
pub use device::{Device, DeviceBuilder, Missing, Set};
pub use dispatcher::{Command, Reply, RequestType, SetupPacket};
pub use error::{BuildError, Result};
pub use hid::{HidKeyboard, KeyReport, KeyState};
pub use util::{DEFAULT_CPU_HZ, target_reference, timer_setting_for};
pub use window::{AcquisitionWindow, WindowController};
