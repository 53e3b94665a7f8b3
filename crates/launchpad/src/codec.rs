//! Coordinate codec.
//!
//! Maps between the device's MIDI note convention and grid coordinates.
//! Pure functions only, no I/O.
//!
//! Inputs outside the device layout are not validated. They produce
//! out-of-grid coordinates or wrapped bytes, and the device is the final
//! arbiter of what they mean.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transport::RawEvent;

/// Note On status byte (channel 1).
pub const NOTE_ON: u8 = 0x90;

/// Control Change status byte (channel 1).
pub const CONTROL_CHANGE: u8 = 0xB0;

/// Pads per row and per column.
pub const GRID_SIZE: u8 = 8;

/// Note distance between two adjacent rows.
const ROW_STRIDE: u8 = 16;

/// Velocity bias selecting an immediate, non-flashing light update
/// (copy + clear bits of the device's color byte). Must not be altered.
const LIGHT_FLAGS: u8 = 8 + 4;

/// LED intensity levels understood by the device, per color channel.
pub mod intensity {
    pub const OFF: u8 = 0;
    pub const LOW: u8 = 1;
    pub const MEDIUM: u8 = 2;
    pub const FULL: u8 = 3;
}

/// A pressed pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hit {
    /// Column, 0 = left
    pub x: u8,
    /// Row, 0 = bottom
    pub y: u8,
}

impl Hit {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A three-byte MIDI channel message ready for the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl ShortMessage {
    pub fn to_bytes(self) -> [u8; 3] {
        [self.status, self.data1, self.data2]
    }
}

/// Decode a pad note and its velocity into a hit.
///
/// Zero velocity is a release and never yields a hit.
pub fn decode(note: u8, velocity: u8) -> Option<Hit> {
    if velocity == 0 {
        return None;
    }

    let x = note % GRID_SIZE;
    let y = (GRID_SIZE - 1).wrapping_sub((note - x) / ROW_STRIDE);
    Some(Hit { x, y })
}

/// Decode a raw input event.
///
/// Only Note On messages carry presses; the note is in `data1` and the
/// velocity in `data2`. Everything else decodes to `None`, including the
/// top-row buttons, which send control changes and are not grid pads.
pub fn decode_event(event: &RawEvent) -> Option<Hit> {
    if event.status & 0xF0 != NOTE_ON {
        return None;
    }
    decode(event.data1, event.data2)
}

/// Encode a light command for pad `(x, y)`.
pub fn encode_light(x: u8, y: u8, green: u8, red: u8) -> ShortMessage {
    let note = x.wrapping_add(ROW_STRIDE.wrapping_mul((GRID_SIZE - 1).wrapping_sub(y)));
    let velocity = ROW_STRIDE
        .wrapping_mul(green)
        .wrapping_add(red)
        .wrapping_add(LIGHT_FLAGS);

    ShortMessage {
        status: NOTE_ON,
        data1: note,
        data2: velocity,
    }
}

/// Encode the command that turns off every LED on the grid.
pub fn encode_reset() -> ShortMessage {
    ShortMessage {
        status: CONTROL_CHANGE,
        data1: 0,
        data2: 0,
    }
}
