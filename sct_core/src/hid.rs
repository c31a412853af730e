//! HID boot-keyboard interface.
//!
//! The device enumerates as a keyboard so it needs no host driver. The
//! key-event machine is kept dormant: nothing in the device queues a key on
//! its own, `queue_key` is the only way in.

/// `bRequest` of the HID class requests handled here.
pub const HID_GET_REPORT: u8 = 0x01;
pub const HID_GET_IDLE: u8 = 0x02;
pub const HID_SET_IDLE: u8 = 0x0A;

/// Usage code sent for the single supported key.
pub const OKAY_KEY_USAGE: u8 = 0x4B;

/// Report descriptor: one modifier byte and one key-code byte.
pub const KEYBOARD_REPORT_DESCRIPTOR: [u8; 35] = [
    0x05, 0x01, // USAGE_PAGE (Generic Desktop)
    0x09, 0x06, // USAGE (Keyboard)
    0xA1, 0x01, // COLLECTION (Application)
    0x05, 0x07, //   USAGE_PAGE (Keyboard)
    0x19, 0xE0, //   USAGE_MINIMUM (Keyboard LeftControl)
    0x29, 0xE7, //   USAGE_MAXIMUM (Keyboard Right GUI)
    0x15, 0x00, //   LOGICAL_MINIMUM (0)
    0x25, 0x01, //   LOGICAL_MAXIMUM (1)
    0x75, 0x01, //   REPORT_SIZE (1)
    0x95, 0x08, //   REPORT_COUNT (8)
    0x81, 0x02, //   INPUT (Data,Var,Abs)
    0x95, 0x01, //   REPORT_COUNT (1)
    0x75, 0x08, //   REPORT_SIZE (8)
    0x25, 0x65, //   LOGICAL_MAXIMUM (101)
    0x19, 0x00, //   USAGE_MINIMUM (Reserved)
    0x29, 0x65, //   USAGE_MAXIMUM (Keyboard Application)
    0x81, 0x00, //   INPUT (Data,Ary,Abs)
    0xC0, // END_COLLECTION
];

/// Two-byte input report: `[modifiers, key]`.
pub type KeyReport = [u8; 2];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Idle,
    SendKey,
    ReleaseKey,
}

#[derive(Debug, Default, Clone)]
pub struct HidKeyboard {
    state: KeyState,
    idle_rate: u8,
}

impl HidKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    /// Idle rate set by the host, in 4 ms units.
    pub fn idle_rate(&self) -> u8 {
        self.idle_rate
    }

    /// Arm one key press. Ignored while a press is in flight.
    pub fn queue_key(&mut self) {
        if self.state == KeyState::Idle {
            self.state = KeyState::SendKey;
        }
    }

    /// Produce the next interrupt report when the endpoint can take one.
    pub fn poll(&mut self, endpoint_ready: bool) -> Option<KeyReport> {
        if !endpoint_ready || self.state == KeyState::Idle {
            return None;
        }
        let report = match self.state {
            KeyState::SendKey => [0, OKAY_KEY_USAGE],
            _ => [0, 0],
        };
        self.state = match self.state {
            KeyState::SendKey => KeyState::ReleaseKey,
            _ => KeyState::Idle,
        };
        tracing::trace!(?report, state = ?self.state, "key report");
        Some(report)
    }

    /// Answer a class request. Unknown requests get an empty reply.
    pub fn handle_class_request(&mut self, request: u8, value: u16) -> crate::Reply {
        match request {
            HID_GET_REPORT => crate::Reply::from_bytes(&[0, 0]),
            HID_GET_IDLE => crate::Reply::from_bytes(&[self.idle_rate]),
            HID_SET_IDLE => {
                self.idle_rate = value.to_be_bytes()[0];
                crate::Reply::EMPTY
            }
            _ => crate::Reply::EMPTY,
        }
    }
}
