//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{DeviceHandle, DeviceInfo, InputStream, MidiTransport, OutputStream, RawEvent};
use crate::error::TransportError;

/// Everything the fake streams observed, plus scripted failures.
#[derive(Debug, Default)]
pub struct FakeState {
    /// Read results in order; `None` fails that read. Empty means no events.
    pub reads: VecDeque<Option<Vec<RawEvent>>>,
    pub writes: Vec<[u8; 3]>,
    pub opened_input: Option<(DeviceHandle, usize)>,
    pub opened_output: Option<(DeviceHandle, usize, Duration)>,
    pub input_closes: usize,
    pub output_closes: usize,
    pub fail_open_input: bool,
    pub fail_open_output: bool,
    pub fail_write: bool,
    pub fail_input_close: bool,
    pub fail_output_close: bool,
}

pub type SharedState = Arc<Mutex<FakeState>>;

pub struct FakeTransport {
    pub devices: Vec<DeviceInfo>,
    pub state: SharedState,
}

impl FakeTransport {
    /// One device named "Launchpad" with both directions.
    pub fn launchpad() -> Self {
        Self::with_devices(vec![DeviceInfo::new("Launchpad", true, true)])
    }

    pub fn with_devices(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            state: SharedState::default(),
        }
    }

    pub fn push_read(&self, events: Vec<RawEvent>) {
        self.state.lock().reads.push_back(Some(events));
    }

    pub fn push_read_error(&self) {
        self.state.lock().reads.push_back(None);
    }
}

impl MidiTransport for FakeTransport {
    fn devices(&mut self) -> Result<Vec<DeviceInfo>, TransportError> {
        Ok(self.devices.clone())
    }

    fn open_input(
        &mut self,
        handle: DeviceHandle,
        buffer_size: usize,
    ) -> Result<Box<dyn InputStream>, TransportError> {
        let mut state = self.state.lock();
        if state.fail_open_input {
            return Err(TransportError::Connect("input refused".to_string()));
        }
        state.opened_input = Some((handle, buffer_size));
        Ok(Box::new(FakeInput {
            state: Arc::clone(&self.state),
        }))
    }

    fn open_output(
        &mut self,
        handle: DeviceHandle,
        buffer_size: usize,
        latency: Duration,
    ) -> Result<Box<dyn OutputStream>, TransportError> {
        let mut state = self.state.lock();
        if state.fail_open_output {
            return Err(TransportError::Connect("output refused".to_string()));
        }
        state.opened_output = Some((handle, buffer_size, latency));
        Ok(Box::new(FakeOutput {
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeInput {
    state: SharedState,
}

impl InputStream for FakeInput {
    fn read(&mut self, max: usize) -> Result<Vec<RawEvent>, TransportError> {
        let mut state = self.state.lock();
        match state.reads.pop_front() {
            Some(Some(mut events)) => {
                events.truncate(max);
                Ok(events)
            }
            Some(None) => Err(TransportError::Other("scripted read failure".to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.input_closes += 1;
        if state.fail_input_close {
            return Err(TransportError::Other("scripted close failure".to_string()));
        }
        Ok(())
    }
}

struct FakeOutput {
    state: SharedState,
}

impl OutputStream for FakeOutput {
    fn write_short(&mut self, status: u8, data1: u8, data2: u8) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_write {
            return Err(TransportError::Other("scripted write failure".to_string()));
        }
        state.writes.push([status, data1, data2]);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.output_closes += 1;
        if state.fail_output_close {
            return Err(TransportError::Other("scripted close failure".to_string()));
        }
        Ok(())
    }
}

pub fn press(note: u8) -> RawEvent {
    RawEvent::new(0x90, note, 0x7F, 0)
}

pub fn release(note: u8) -> RawEvent {
    RawEvent::new(0x90, note, 0x00, 0)
}
