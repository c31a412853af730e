//! Vendor command protocol.
//!
//! Every request is a device-to-host control transfer; `bRequest` selects the
//! command and `wValue` carries the echo payload. Replies are raw
//! little-endian bytes with no framing.

use sct_traits::Board;

use crate::device::Device;
use crate::window::SUM_MASK;

/// Longest reply any command produces.
pub const MAX_REPLY_LEN: usize = 3;

/// Reply bytes for one request, built on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    buf: [u8; MAX_REPLY_LEN],
    len: u8,
}

impl Reply {
    pub const EMPTY: Self = Self {
        buf: [0; MAX_REPLY_LEN],
        len: 0,
    };

    /// Copy up to `MAX_REPLY_LEN` bytes; anything beyond is dropped.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let n = bytes.len().min(MAX_REPLY_LEN);
        let mut buf = [0; MAX_REPLY_LEN];
        buf[..n].copy_from_slice(&bytes[..n]);
        Self { buf, len: n as u8 }
    }

    pub fn u16_le(v: u16) -> Self {
        Self::from_bytes(&v.to_le_bytes())
    }

    /// Low 24 bits of `v`, little-endian.
    pub fn u24_le(v: u32) -> Self {
        let b = (v & SUM_MASK).to_le_bytes();
        Self::from_bytes(&b[..3])
    }

    pub fn pair(a: u8, b: u8) -> Self {
        Self::from_bytes(&[a, b])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Echo = 0,
    GetCalibration = 1,
    StartAcquisition = 6,
    GetAverage = 7,
    GetAccumulated = 8,
    GetCount = 9,
}

impl Command {
    pub const ALL: [Self; 6] = [
        Self::Echo,
        Self::GetCalibration,
        Self::StartAcquisition,
        Self::GetAverage,
        Self::GetAccumulated,
        Self::GetCount,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        Self::from_code(code).ok_or(code)
    }
}

/// Request type field (bits 6..5 of `bmRequestType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Standard,
    Class,
    Vendor,
    Reserved,
}

impl RequestType {
    pub fn from_bm_request_type(bm: u8) -> Self {
        match (bm >> 5) & 0x03 {
            0 => Self::Standard,
            1 => Self::Class,
            2 => Self::Vendor,
            _ => Self::Reserved,
        }
    }
}

/// `bmRequestType` of a vendor, device-to-host, device-recipient request.
pub const VENDOR_IN_DEVICE: u8 = 0xC0;

/// The 8-byte SETUP stage of a control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupPacket {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl SetupPacket {
    pub fn from_bytes(b: [u8; 8]) -> Self {
        Self {
            request_type: b[0],
            request: b[1],
            value: u16::from_le_bytes([b[2], b[3]]),
            index: u16::from_le_bytes([b[4], b[5]]),
            length: u16::from_le_bytes([b[6], b[7]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let v = self.value.to_le_bytes();
        let i = self.index.to_le_bytes();
        let l = self.length.to_le_bytes();
        [self.request_type, self.request, v[0], v[1], i[0], i[1], l[0], l[1]]
    }

    pub fn vendor_in(request: u8, value: u16) -> Self {
        Self {
            request_type: VENDOR_IN_DEVICE,
            request,
            value,
            index: 0,
            length: MAX_REPLY_LEN as u16,
        }
    }

    pub fn kind(&self) -> RequestType {
        RequestType::from_bm_request_type(self.request_type)
    }
}

impl<B: Board> Device<B> {
    /// Execute one vendor command. Unknown codes get an empty reply and
    /// leave the device untouched.
    pub fn dispatch(&mut self, code: u8, value: u16) -> Reply {
        let Some(cmd) = Command::from_code(code) else {
            tracing::trace!(code, "unknown vendor request");
            return Reply::EMPTY;
        };
        let reply = match cmd {
            Command::Echo => Reply::u16_le(value),
            Command::GetCalibration => {
                Reply::pair(self.factory_calibration, self.board.calibration())
            }
            Command::StartAcquisition => {
                self.controller.start(&mut self.window, &mut self.board);
                Reply::EMPTY
            }
            Command::GetAverage => Reply::u16_le(self.window.average().unwrap_or(0)),
            Command::GetAccumulated => {
                let sum = if self.window.is_running() {
                    0
                } else {
                    self.window.accumulated_sum()
                };
                Reply::u24_le(sum)
            }
            Command::GetCount => {
                let count = if self.window.is_running() {
                    0
                } else {
                    self.window.sample_count()
                };
                Reply::u16_le(count)
            }
        };
        tracing::trace!(?cmd, value, reply = ?reply.as_bytes(), "vendor request");
        reply
    }

    /// Route a SETUP packet to the vendor dispatcher or the HID interface.
    ///
    /// Class requests go to the keyboard; vendor and reserved request types
    /// both go to the vendor table. Standard requests belong to the transport
    /// and get an empty reply here.
    pub fn handle_setup(&mut self, setup: &SetupPacket) -> Reply {
        let reply = match setup.kind() {
            RequestType::Vendor | RequestType::Reserved => {
                self.dispatch(setup.request, setup.value)
            }
            RequestType::Class => self
                .keyboard
                .handle_class_request(setup.request, setup.value),
            RequestType::Standard => Reply::EMPTY,
        };
        // never return more than the host asked for
        if reply.len() > usize::from(setup.length) {
            Reply::from_bytes(&reply.as_bytes()[..usize::from(setup.length)])
        } else {
            reply
        }
    }
}
