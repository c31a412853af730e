//! Simulated hardware for the instrument core.
//!
//! `SimBoard` implements every `sct_traits` peripheral trait on top of a
//! `Clock`, so the device can run in-process for the host tool and tests.

pub mod error;
pub mod model;
pub mod sim;
pub mod util;

pub use error::HwError;
pub use model::{OscillatorModel, SignalSource};
pub use sim::SimBoard;
