//! Host-side commands, one control transfer each.

use std::time::Duration;

use rand::Rng;
use sct_core::dispatcher::Command;
use thiserror::Error;

use crate::channel::ControlChannel;

/// Receive buffer size for every request.
const BUF_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("only {received} bytes {what} received")]
    ShortReply { what: &'static str, received: usize },
    #[error("only {received} bytes received in iteration {iteration} (value sent = {sent:#x})")]
    ShortEcho {
        received: usize,
        iteration: u32,
        sent: u16,
    },
    #[error("data error: received {received:#x} instead of {sent:#x} in iteration {iteration}")]
    EchoMismatch {
        sent: u16,
        received: u16,
        iteration: u32,
    },
}

/// Statistics of one closed acquisition window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub average: u16,
    pub accumulated: u32,
    pub count: u16,
}

fn request<C: ControlChannel + ?Sized>(
    ch: &mut C,
    cmd: Command,
    value: u16,
    min_len: usize,
    what: &'static str,
) -> eyre::Result<[u8; BUF_LEN]> {
    let mut buf = [0u8; BUF_LEN];
    let n = ch.control_in(cmd.code(), value, 0, &mut buf)?;
    tracing::trace!(?cmd, value, received = n, "control transfer");
    if n < min_len {
        return Err(HostError::ShortReply { what, received: n }.into());
    }
    Ok(buf)
}

/// Echo `iterations` random values and compare each reply.
pub fn testcomm<C, R>(ch: &mut C, iterations: u32, rng: &mut R) -> eyre::Result<u32>
where
    C: ControlChannel + ?Sized,
    R: Rng,
{
    for iteration in 0..iterations {
        let sent: u16 = rng.r#gen();
        let mut buf = [0u8; BUF_LEN];
        let n = ch.control_in(Command::Echo.code(), sent, 0, &mut buf)?;
        if n < 2 {
            return Err(HostError::ShortEcho {
                received: n,
                iteration,
                sent,
            }
            .into());
        }
        let received = u16::from_le_bytes([buf[0], buf[1]]);
        if received != sent {
            return Err(HostError::EchoMismatch {
                sent,
                received,
                iteration,
            }
            .into());
        }
    }
    tracing::debug!(iterations, "echo test passed");
    Ok(iterations)
}

/// `(factory, active)` oscillator calibration values.
pub fn get_osccal<C: ControlChannel + ?Sized>(ch: &mut C) -> eyre::Result<(u8, u8)> {
    let b = request(ch, Command::GetCalibration, 0, 2, "getosccal")?;
    Ok((b[0], b[1]))
}

pub fn run_adc<C: ControlChannel + ?Sized>(ch: &mut C) -> eyre::Result<()> {
    let mut buf = [0u8; BUF_LEN];
    ch.control_in(Command::StartAcquisition.code(), 0, 0, &mut buf)?;
    Ok(())
}

pub fn get_adc<C: ControlChannel + ?Sized>(ch: &mut C) -> eyre::Result<u16> {
    let b = request(ch, Command::GetAverage, 0, 2, "from ADC")?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

pub fn get_acc<C: ControlChannel + ?Sized>(ch: &mut C) -> eyre::Result<u32> {
    let b = request(ch, Command::GetAccumulated, 0, 3, "from ADC")?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], 0]))
}

pub fn get_cnt<C: ControlChannel + ?Sized>(ch: &mut C) -> eyre::Result<u16> {
    let b = request(ch, Command::GetCount, 0, 2, "from ADC")?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

/// Start a window, let the device run for `settle`, then read it back.
pub fn measure<C: ControlChannel + ?Sized>(
    ch: &mut C,
    settle: Duration,
) -> eyre::Result<Measurement> {
    run_adc(ch)?;
    ch.wait(settle);
    Ok(Measurement {
        average: get_adc(ch)?,
        accumulated: get_acc(ch)?,
        count: get_cnt(ch)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Channel that answers every request with the same bytes.
    struct Canned {
        reply: Vec<u8>,
        waited: Duration,
    }

    impl ControlChannel for Canned {
        fn control_in(
            &mut self,
            _request: u8,
            _value: u16,
            _index: u16,
            buf: &mut [u8],
        ) -> eyre::Result<usize> {
            let n = self.reply.len().min(buf.len());
            buf[..n].copy_from_slice(&self.reply[..n]);
            Ok(n)
        }

        fn wait(&mut self, d: Duration) {
            self.waited += d;
        }
    }

    fn canned(reply: &[u8]) -> Canned {
        Canned {
            reply: reply.to_vec(),
            waited: Duration::ZERO,
        }
    }

    #[test]
    fn short_reply_is_reported_with_byte_count() {
        let err = get_acc(&mut canned(&[1, 2])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<HostError>(),
            Some(&HostError::ShortReply {
                what: "from ADC",
                received: 2
            })
        );
        assert_eq!(err.to_string(), "only 2 bytes from ADC received");
    }

    #[test]
    fn echo_mismatch_is_detected() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = testcomm(&mut canned(&[0, 0]), 1000, &mut rng).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HostError>(),
            Some(HostError::EchoMismatch { .. })
        ));
    }

    #[test]
    fn values_decode_little_endian() {
        assert_eq!(get_adc(&mut canned(&[0x34, 0x12])).unwrap(), 0x1234);
        assert_eq!(get_acc(&mut canned(&[1, 2, 3])).unwrap(), 0x0003_0201);
        assert_eq!(get_osccal(&mut canned(&[100, 61])).unwrap(), (100, 61));
    }

    #[test]
    fn measure_waits_between_start_and_read() {
        let mut ch = canned(&[5, 0, 0]);
        let m = measure(&mut ch, Duration::from_millis(250)).unwrap();
        assert_eq!(ch.waited, Duration::from_millis(250));
        assert_eq!(m.average, 5);
        assert_eq!(m.accumulated, 5);
        assert_eq!(m.count, 5);
    }
}
