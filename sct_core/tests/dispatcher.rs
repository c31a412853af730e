//! Vendor and HID request handling.

use proptest::prelude::*;
use sct_core::dispatcher::{Command, SetupPacket};
use sct_core::hid::{HID_GET_IDLE, HID_GET_REPORT, HID_SET_IDLE, OKAY_KEY_USAGE};
use sct_core::mocks::ScriptedBoard;
use sct_core::Device;

fn device() -> Device<ScriptedBoard> {
    Device::builder()
        .with_board(ScriptedBoard::new(100).with_samples([10, 20, 30]))
        .build()
        .expect("build device")
}

fn class_request(request_type: u8, request: u8, value: u16, length: u16) -> SetupPacket {
    SetupPacket {
        request_type,
        request,
        value,
        index: 0,
        length,
    }
}

#[test]
fn echo_returns_every_value_unchanged() {
    let mut dev = device();
    for v in 0..=u16::MAX {
        let reply = dev.dispatch(Command::Echo.code(), v);
        assert_eq!(reply.as_bytes(), &v.to_le_bytes());
    }
}

#[test]
fn get_calibration_reports_factory_then_active() {
    let mut dev = device();
    assert_eq!(dev.dispatch(Command::GetCalibration.code(), 0).as_bytes(), &[100, 100]);
    dev.on_reset();
    assert_eq!(dev.dispatch(Command::GetCalibration.code(), 0).as_bytes(), &[100, 61]);
}

#[test]
fn unknown_codes_reply_empty_and_change_nothing() {
    let mut dev = device();
    dev.dispatch(Command::StartAcquisition.code(), 0);
    dev.poll();
    let window = *dev.window();
    let osccal = dev.active_calibration();
    let started = dev.board().conversions_started;

    for code in 0..=u8::MAX {
        if Command::from_code(code).is_some() {
            continue;
        }
        let reply = dev.dispatch(code, 0xFFFF);
        assert!(reply.is_empty(), "code {code} replied {:?}", reply.as_bytes());
    }
    assert_eq!(*dev.window(), window);
    assert_eq!(dev.active_calibration(), osccal);
    assert_eq!(dev.board().conversions_started, started);
}

#[test]
fn setup_packets_route_by_request_type() {
    let mut dev = device();
    let r = dev.handle_setup(&SetupPacket::vendor_in(Command::Echo.code(), 0xBEEF));
    assert_eq!(r.as_bytes(), &[0xEF, 0xBE]);

    // standard GET_DESCRIPTOR belongs to the transport
    let r = dev.handle_setup(&class_request(0x80, 0x06, 0x0100, 18));
    assert!(r.is_empty());
}

#[test]
fn reserved_request_type_uses_the_vendor_table() {
    let mut dev = device();
    // bits 6..5 = 3
    let r = dev.handle_setup(&class_request(0xE0, Command::Echo.code(), 0x1234, 2));
    assert_eq!(r.as_bytes(), &[0x34, 0x12]);
    let r = dev.handle_setup(&class_request(0xE0, Command::GetCalibration.code(), 0, 2));
    assert_eq!(r.as_bytes(), &[100, 100]);
}

#[test]
fn reply_never_exceeds_requested_length() {
    let mut dev = device();
    let mut setup = SetupPacket::vendor_in(Command::GetAccumulated.code(), 0);
    setup.length = 2;
    assert_eq!(dev.handle_setup(&setup).len(), 2);
    setup.length = 0;
    assert!(dev.handle_setup(&setup).is_empty());
}

#[test]
fn hid_class_requests() {
    let mut dev = device();
    let r = dev.handle_setup(&class_request(0xA1, HID_GET_REPORT, 0x0100, 8));
    assert_eq!(r.as_bytes(), &[0, 0]);

    let r = dev.handle_setup(&class_request(0x21, HID_SET_IDLE, 0x0400, 0));
    assert!(r.is_empty());
    let r = dev.handle_setup(&class_request(0xA1, HID_GET_IDLE, 0, 1));
    assert_eq!(r.as_bytes(), &[4]);

    // unsupported class request
    let r = dev.handle_setup(&class_request(0xA1, 0x03, 0, 1));
    assert!(r.is_empty());
}

#[test]
fn key_machine_stays_dormant_until_queued() {
    let mut dev = device();
    dev.on_reset();
    dev.dispatch(Command::StartAcquisition.code(), 0);
    for _ in 0..10 {
        dev.poll();
        assert_eq!(dev.next_interrupt_report(true), None);
    }
    dev.keyboard_mut().queue_key();
    assert_eq!(dev.next_interrupt_report(true), Some([0, OKAY_KEY_USAGE]));
    assert_eq!(dev.next_interrupt_report(true), Some([0, 0]));
    assert_eq!(dev.next_interrupt_report(true), None);
}

proptest! {
    #[test]
    fn raw_setup_bytes_never_panic(bytes in any::<[u8; 8]>()) {
        let mut dev = device();
        let setup = SetupPacket::from_bytes(bytes);
        let reply = dev.handle_setup(&setup);
        prop_assert!(reply.len() <= usize::from(setup.length));
        prop_assert!(reply.len() <= 3);
    }
}
