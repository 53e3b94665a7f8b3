//! midir-backed transport.
//!
//! midir delivers input through a callback, so received messages are queued
//! in a bounded buffer and drained by [`InputStream::read`]. Ports are listed
//! once per direction: every input port first, then every output port.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use parking_lot::Mutex;

use super::{DeviceHandle, DeviceInfo, InputStream, MidiTransport, OutputStream, RawEvent};
use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Input,
    Output,
}

/// An enumerated port, remembered by its backend id so the exact port that
/// was listed is the one reopened, even among identically named ports.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    name: String,
    id: String,
    direction: Direction,
}

/// Transport backed by the platform MIDI API through midir.
pub struct MidirTransport {
    client_name: String,
    endpoints: Vec<Endpoint>,
}

impl MidirTransport {
    pub fn new() -> Self {
        Self::with_client_name("launchpad")
    }

    /// Use a custom client name, shown by the OS in MIDI connection lists.
    pub fn with_client_name(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            endpoints: Vec::new(),
        }
    }
}

impl Default for MidirTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a handle to the endpoint it was issued for.
fn select_endpoint(
    endpoints: &[Endpoint],
    handle: DeviceHandle,
    direction: Direction,
) -> Result<&Endpoint, TransportError> {
    let endpoint = endpoints.get(handle.index()).ok_or_else(|| {
        TransportError::PortNotFound(format!("no device at index {}", handle.index()))
    })?;

    if endpoint.direction != direction {
        return Err(TransportError::PortNotFound(format!(
            "{} is not an {}",
            endpoint.name,
            match direction {
                Direction::Input => "input",
                Direction::Output => "output",
            }
        )));
    }
    Ok(endpoint)
}

impl MidiTransport for MidirTransport {
    fn devices(&mut self) -> Result<Vec<DeviceInfo>, TransportError> {
        let midi_in = MidiInput::new(&self.client_name)?;
        let midi_out = MidiOutput::new(&self.client_name)?;

        let mut endpoints = Vec::new();
        for port in midi_in.ports() {
            match midi_in.port_name(&port) {
                Ok(name) => endpoints.push(Endpoint {
                    name,
                    id: port.id(),
                    direction: Direction::Input,
                }),
                Err(e) => tracing::debug!("Skipping unnamed MIDI input port: {}", e),
            }
        }
        for port in midi_out.ports() {
            match midi_out.port_name(&port) {
                Ok(name) => endpoints.push(Endpoint {
                    name,
                    id: port.id(),
                    direction: Direction::Output,
                }),
                Err(e) => tracing::debug!("Skipping unnamed MIDI output port: {}", e),
            }
        }

        let devices = endpoints
            .iter()
            .map(|endpoint| {
                let input = endpoint.direction == Direction::Input;
                DeviceInfo::new(endpoint.name.clone(), input, !input)
            })
            .collect();

        self.endpoints = endpoints;
        Ok(devices)
    }

    fn open_input(
        &mut self,
        handle: DeviceHandle,
        buffer_size: usize,
    ) -> Result<Box<dyn InputStream>, TransportError> {
        let endpoint = select_endpoint(&self.endpoints, handle, Direction::Input)?;

        let midi_in = MidiInput::new(&self.client_name)?;
        let port = midi_in
            .find_port_by_id(endpoint.id.clone())
            .ok_or_else(|| TransportError::PortNotFound(endpoint.name.clone()))?;

        let queue = Arc::new(Mutex::new(EventQueue::new(buffer_size)));
        let sink = Arc::clone(&queue);
        let connection = midi_in
            .connect(
                &port,
                "launchpad-input",
                move |timestamp, message, _| {
                    sink.lock().push(timestamp, message);
                },
                (),
            )
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!("Opened MIDI input '{}' ({})", endpoint.name, endpoint.id);
        Ok(Box::new(MidirInputStream {
            connection: Some(connection),
            queue,
        }))
    }

    fn open_output(
        &mut self,
        handle: DeviceHandle,
        _buffer_size: usize,
        latency: Duration,
    ) -> Result<Box<dyn OutputStream>, TransportError> {
        let endpoint = select_endpoint(&self.endpoints, handle, Direction::Output)?;

        if !latency.is_zero() {
            tracing::warn!(
                "Output latency of {:?} requested, but midir sends immediately",
                latency
            );
        }

        let midi_out = MidiOutput::new(&self.client_name)?;
        let port = midi_out
            .find_port_by_id(endpoint.id.clone())
            .ok_or_else(|| TransportError::PortNotFound(endpoint.name.clone()))?;

        let connection = midi_out
            .connect(&port, "launchpad-output")
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!("Opened MIDI output '{}' ({})", endpoint.name, endpoint.id);
        Ok(Box::new(MidirOutputStream {
            connection: Some(connection),
        }))
    }
}

/// Bounded receive buffer filled by the midir callback.
#[derive(Debug)]
struct EventQueue {
    events: VecDeque<RawEvent>,
    capacity: usize,
    overflowed: bool,
}

impl EventQueue {
    fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            overflowed: false,
        }
    }

    fn push(&mut self, timestamp: u64, message: &[u8]) {
        let Some(&status) = message.first() else {
            return;
        };

        // New events are dropped once full; the next read reports it
        if self.events.len() >= self.capacity {
            self.overflowed = true;
            return;
        }

        self.events.push_back(RawEvent {
            status,
            data1: message.get(1).copied().unwrap_or(0),
            data2: message.get(2).copied().unwrap_or(0),
            timestamp,
        });
    }

    fn drain(&mut self, max: usize) -> Result<Vec<RawEvent>, TransportError> {
        if self.overflowed {
            self.overflowed = false;
            return Err(TransportError::BufferOverflow);
        }

        let count = max.min(self.events.len());
        Ok(self.events.drain(..count).collect())
    }
}

struct MidirInputStream {
    connection: Option<MidiInputConnection<()>>,
    queue: Arc<Mutex<EventQueue>>,
}

impl InputStream for MidirInputStream {
    fn read(&mut self, max: usize) -> Result<Vec<RawEvent>, TransportError> {
        if self.connection.is_none() {
            return Err(TransportError::Closed);
        }
        self.queue.lock().drain(max)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let connection = self.connection.take().ok_or(TransportError::Closed)?;
        connection.close();
        Ok(())
    }
}

struct MidirOutputStream {
    connection: Option<MidiOutputConnection>,
}

impl OutputStream for MidirOutputStream {
    fn write_short(&mut self, status: u8, data1: u8, data2: u8) -> Result<(), TransportError> {
        let connection = self.connection.as_mut().ok_or(TransportError::Closed)?;
        connection.send(&[status, data1, data2])?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let connection = self.connection.take().ok_or(TransportError::Closed)?;
        connection.close();
        Ok(())
    }
}
