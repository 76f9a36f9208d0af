//! Uplink framing and a logging transport.
//!
//! Frames match the node's LoRaWAN payload layout:
//!
//! | Frame     | Bytes | Layout                               |
//! |-----------|-------|--------------------------------------|
//! | reading   | 3     | depth `i16` big-endian, power `u8`   |
//! | heartbeat | 1     | power `u8`                           |
//!
//! Depth saturates to the `i16` range. The modem itself is out of scope
//! for this crate; [`LoggingRadio`] frames each uplink and writes it to the
//! log, which is what a bench node with no gateway in range does anyway.

use log::{info, warn};

use crate::app::ports::{Status, TransportPort};
use crate::Measurement;

/// Largest frame the node emits.
pub const MAX_FRAME_LEN: usize = 3;

pub type Frame = heapless::Vec<u8, MAX_FRAME_LEN>;

pub fn encode_reading(value: Measurement, power: u8) -> Frame {
    let depth = value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
    let [hi, lo] = depth.to_be_bytes();
    // Capacity equals the frame length, so this cannot fail.
    Frame::from_slice(&[hi, lo, power]).unwrap_or_default()
}

pub fn encode_heartbeat(power: u8) -> Frame {
    Frame::from_slice(&[power]).unwrap_or_default()
}

/// [`TransportPort`] that logs framed uplinks instead of keying a modem.
///
/// Failures can be injected to rehearse a flaky link.
#[derive(Debug, Default)]
pub struct LoggingRadio {
    joined: bool,
    link_down: bool,
    fail_next: u32,
    frames_sent: u32,
    last_frame: Option<Frame>,
}

impl LoggingRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` uplinks.
    pub fn fail_next(&mut self, count: u32) {
        self.fail_next = count;
    }

    /// While down, joins and uplinks all fail.
    pub fn set_link_down(&mut self, down: bool) {
        self.link_down = down;
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.last_frame.as_deref()
    }

    fn transmit(&mut self, frame: Frame) -> Status {
        if self.link_down {
            warn!("radio: link down, dropping {} byte frame", frame.len());
            return Status::SendFailed;
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            warn!("radio: injected failure ({} left)", self.fail_next);
            return Status::SendFailed;
        }
        info!("radio: uplink {:02X?}", frame.as_slice());
        self.frames_sent = self.frames_sent.wrapping_add(1);
        self.last_frame = Some(frame);
        Status::Ok
    }
}

impl TransportPort for LoggingRadio {
    fn join(&mut self) -> Status {
        if self.link_down {
            warn!("radio: join failed, no link");
            return Status::SendFailed;
        }
        self.joined = true;
        info!("radio: joined");
        Status::Ok
    }

    fn send_reading(&mut self, value: Measurement, power: u8) -> Status {
        self.transmit(encode_reading(value, power))
    }

    fn send_heartbeat(&mut self, power: u8) -> Status {
        self.transmit(encode_heartbeat(power))
    }
}
