//! Control-transfer channel to the instrument.

use std::time::Duration;

use eyre::WrapErr;
use sct_core::dispatcher::{SetupPacket, VENDOR_IN_DEVICE};
use sct_core::{Device, DeviceCfg};
use sct_hardware::{OscillatorModel, SignalSource, SimBoard};
use sct_traits::ManualClock;

/// Time one control transfer occupies on the bus.
pub const TRANSFER_TIME: Duration = Duration::from_millis(1);

pub trait ControlChannel {
    /// Vendor, device-to-host, device-recipient control transfer.
    /// Returns the number of bytes written into `buf`.
    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> eyre::Result<usize>;

    /// Let the device run for `d` between transfers.
    fn wait(&mut self, d: Duration);
}

/// The device core on a simulated board, driven in-process.
///
/// Simulated time only advances while the device loop runs, so results do
/// not depend on how fast the host is.
pub struct SimChannel {
    device: Device<SimBoard>,
    clock: ManualClock,
    loop_period: Duration,
}

impl SimChannel {
    /// Build the device from config and run the bus-reset calibration.
    pub fn from_config(cfg: &sct_config::Config) -> eyre::Result<Self> {
        let osc = OscillatorModel::new(
            cfg.oscillator.low_base_hz,
            cfg.oscillator.high_base_hz,
            cfg.oscillator.step_hz,
        )
        .wrap_err("oscillator model")?;
        let signal = SignalSource::new(
            cfg.signal.amplitude_counts,
            cfg.signal.frequency_hz,
            cfg.signal.offset_counts,
        )
        .wrap_err("signal source")?;

        let clock = ManualClock::new();
        let board = SimBoard::new(clock.clone(), cfg.device.factory_calibration)
            .with_oscillator(osc)
            .with_signal(signal);
        let mut device = Device::builder()
            .with_board(board)
            .with_config(DeviceCfg::from(cfg))
            .build()
            .wrap_err("build device")?;
        device.on_reset();

        Ok(Self {
            device,
            clock,
            loop_period: Duration::from_micros(cfg.simulation.loop_period_us.max(1)),
        })
    }

    pub fn device(&self) -> &Device<SimBoard> {
        &self.device
    }

    /// Run the device main loop for `d` of simulated time.
    pub fn idle(&mut self, d: Duration) {
        let end = self.clock.elapsed() + d;
        while self.clock.elapsed() < end {
            self.clock.advance(self.loop_period);
            self.device.poll();
        }
    }
}

impl ControlChannel for SimChannel {
    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> eyre::Result<usize> {
        let setup = SetupPacket {
            request_type: VENDOR_IN_DEVICE,
            request,
            value,
            index,
            length: u16::try_from(buf.len()).unwrap_or(u16::MAX),
        };
        let reply = self.device.handle_setup(&setup);
        let n = reply.len().min(buf.len());
        buf[..n].copy_from_slice(&reply.as_bytes()[..n]);
        self.idle(TRANSFER_TIME);
        Ok(n)
    }

    fn wait(&mut self, d: Duration) {
        self.idle(d);
    }
}
