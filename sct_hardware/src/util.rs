use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Wall time taken by `cycles` CPU cycles at `hz`. A zero clock is treated as 1 Hz.
pub fn cycles_to_duration(cycles: u64, hz: u64) -> Duration {
    let nanos = u128::from(cycles) * NANOS_PER_SEC / u128::from(hz.max(1));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Encode a signed reading as the ADC's 10-bit two's complement result.
/// Values outside `-512..=511` are clamped first.
pub fn encode_bipolar(v: i32) -> u16 {
    let v = v.clamp(-512, 511);
    (v & 0x3FF) as u16
}
