//! MIDI transport boundary.
//!
//! The driver talks to hardware only through these traits. [`MidirTransport`]
//! is the production backend; tests plug in fakes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

mod midir_backend;
#[cfg(test)]
pub(crate) mod mock;

pub use midir_backend::MidirTransport;

/// One enumerated MIDI endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    /// Can be opened with [`MidiTransport::open_input`]
    pub input: bool,
    /// Can be opened with [`MidiTransport::open_output`]
    pub output: bool,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, input: bool, output: bool) -> Self {
        Self {
            name: name.into(),
            input,
            output,
        }
    }
}

/// Opaque reference to an entry of the last enumerated device list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(usize);

impl DeviceHandle {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// A short MIDI message as received from the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
    /// Arrival time in microseconds, relative to a backend-defined origin
    pub timestamp: u64,
}

impl RawEvent {
    pub const fn new(status: u8, data1: u8, data2: u8, timestamp: u64) -> Self {
        Self {
            status,
            data1,
            data2,
            timestamp,
        }
    }
}

/// An open MIDI input.
pub trait InputStream: Send {
    /// Take up to `max` pending events without blocking.
    fn read(&mut self, max: usize) -> Result<Vec<RawEvent>, TransportError>;

    fn close(&mut self) -> Result<(), TransportError>;
}

/// An open MIDI output.
pub trait OutputStream: Send {
    fn write_short(&mut self, status: u8, data1: u8, data2: u8) -> Result<(), TransportError>;

    fn close(&mut self) -> Result<(), TransportError>;
}

/// Device enumeration and stream construction.
pub trait MidiTransport {
    /// List every endpoint, in a stable order. Handles index into this list.
    fn devices(&mut self) -> Result<Vec<DeviceInfo>, TransportError>;

    fn open_input(
        &mut self,
        handle: DeviceHandle,
        buffer_size: usize,
    ) -> Result<Box<dyn InputStream>, TransportError>;

    fn open_output(
        &mut self,
        handle: DeviceHandle,
        buffer_size: usize,
        latency: Duration,
    ) -> Result<Box<dyn OutputStream>, TransportError>;
}
