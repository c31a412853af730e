//! Acquisition window lifecycle driven through the vendor commands.

use sct_core::dispatcher::Command;
use sct_core::mocks::ScriptedBoard;
use sct_core::Device;

fn device_with_samples(raw: &[u16]) -> Device<ScriptedBoard> {
    Device::builder()
        .with_board(ScriptedBoard::new(61).with_samples(raw.iter().copied()))
        .build()
        .expect("build device")
}

fn stats(dev: &mut Device<ScriptedBoard>) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    (
        dev.dispatch(Command::GetAverage.code(), 0).as_bytes().to_vec(),
        dev.dispatch(Command::GetAccumulated.code(), 0).as_bytes().to_vec(),
        dev.dispatch(Command::GetCount.code(), 0).as_bytes().to_vec(),
    )
}

#[test]
fn average_of_three_samples() {
    let mut dev = device_with_samples(&[5, 10, 15]);
    assert!(dev.dispatch(Command::StartAcquisition.code(), 0).is_empty());
    for _ in 0..3 {
        dev.poll();
    }
    dev.board_mut().expire();
    assert!(dev.poll());

    let (avg, acc, cnt) = stats(&mut dev);
    assert_eq!(acc, vec![30, 0, 0]);
    assert_eq!(cnt, vec![3, 0]);
    assert_eq!(avg, vec![10, 0]);
    assert!(!dev.board().adc_enabled);
    assert!(dev.board().armed.is_none());
}

#[test]
fn running_window_reports_zeros() {
    let mut dev = device_with_samples(&[100, 200, 300, 400]);
    dev.dispatch(Command::StartAcquisition.code(), 0);
    for _ in 0..4 {
        dev.poll();
        assert!(dev.window().is_running());
        let (avg, acc, cnt) = stats(&mut dev);
        assert_eq!(avg, vec![0, 0]);
        assert_eq!(acc, vec![0, 0, 0]);
        assert_eq!(cnt, vec![0, 0]);
    }
    assert_eq!(dev.window().sample_count(), 4);
}

#[test]
fn restart_resets_statistics_then_resumes_accumulation() {
    let mut dev = device_with_samples(&[7, 9, 20, 31]);
    dev.dispatch(Command::StartAcquisition.code(), 0);
    dev.poll();
    dev.poll();
    dev.board_mut().expire();
    dev.poll();
    assert_eq!(dev.window().sample_count(), 2);

    dev.dispatch(Command::StartAcquisition.code(), 0);
    assert!(dev.window().is_running());
    assert_eq!(dev.window().sample_count(), 0);
    assert_eq!(dev.window().accumulated_sum(), 0);

    dev.poll();
    dev.poll();
    assert_eq!(dev.window().sample_count(), 2);
    assert_eq!(dev.window().accumulated_sum(), 51);
    dev.board_mut().expire();
    assert!(dev.poll());
    let (avg, acc, cnt) = stats(&mut dev);
    // 51 / 2 = 25.5 -> 26
    assert_eq!(avg, vec![26, 0]);
    assert_eq!(acc, vec![51, 0, 0]);
    assert_eq!(cnt, vec![2, 0]);
}

#[test]
fn window_closed_before_first_conversion_reports_zeros() {
    let mut dev = device_with_samples(&[7]);
    dev.dispatch(Command::StartAcquisition.code(), 0);
    dev.board_mut().expire();
    dev.poll();
    let (avg, acc, cnt) = stats(&mut dev);
    assert_eq!(avg, vec![0, 0]);
    assert_eq!(acc, vec![0, 0, 0]);
    assert_eq!(cnt, vec![0, 0]);
}

#[test]
fn duplicate_start_keeps_window_in_progress() {
    let mut dev = device_with_samples(&[1, 2, 3]);
    dev.dispatch(Command::StartAcquisition.code(), 0);
    dev.poll();
    dev.dispatch(Command::StartAcquisition.code(), 0);
    dev.poll();
    assert_eq!(dev.window().sample_count(), 2);
    assert_eq!(dev.window().accumulated_sum(), 3);
}

#[test]
fn stale_overflow_is_acknowledged_on_start() {
    let mut dev = device_with_samples(&[1]);
    dev.board_mut().overflow = true;
    dev.dispatch(Command::StartAcquisition.code(), 0);
    assert!(!dev.poll());
    assert!(dev.window().is_running());
}

#[test]
fn one_conversion_in_flight_at_a_time() {
    let mut dev = device_with_samples(&[42]);
    dev.dispatch(Command::StartAcquisition.code(), 0);
    dev.board_mut().busy = true;
    dev.poll();
    dev.poll();
    assert_eq!(dev.board().conversions_started, 1);
    assert!(dev.window().is_sample_pending());
    assert_eq!(dev.window().sample_count(), 0);

    dev.board_mut().busy = false;
    dev.poll();
    assert_eq!(dev.window().sample_count(), 1);
    assert_eq!(dev.window().accumulated_sum(), 42);
}

#[test]
fn negative_readings_count_by_magnitude() {
    // 0x3FF is -1, 0x200 is -512
    let mut dev = device_with_samples(&[0x3FF, 0x200, 0x001]);
    dev.dispatch(Command::StartAcquisition.code(), 0);
    for _ in 0..3 {
        dev.poll();
    }
    dev.board_mut().expire();
    dev.poll();
    assert_eq!(dev.window().accumulated_sum(), 1 + 512 + 1);
    // 514 / 3 = 171.33
    assert_eq!(dev.window().average(), Some(171));
}

#[test]
fn polling_while_frozen_touches_nothing() {
    let mut dev = device_with_samples(&[3, 3]);
    dev.poll();
    dev.poll();
    assert_eq!(dev.board().conversions_started, 0);
    assert_eq!(dev.board().samples.len(), 2);
}
