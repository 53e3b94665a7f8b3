//! In-memory transport shared by the integration tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use launchpad::{
    DeviceHandle, DeviceInfo, InputStream, MidiTransport, OutputStream, RawEvent, TransportError,
};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct Recorder {
    /// `None` entries fail the read they are popped by
    pub reads: VecDeque<Option<Vec<RawEvent>>>,
    pub writes: Vec<[u8; 3]>,
    pub closes: usize,
}

pub struct ScriptedTransport {
    pub devices: Vec<DeviceInfo>,
    pub recorder: Arc<Mutex<Recorder>>,
}

impl ScriptedTransport {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            recorder: Arc::default(),
        }
    }

    pub fn batch(&self, notes: &[u8]) {
        let events = notes
            .iter()
            .map(|&note| RawEvent::new(0x90, note, 0x7F, 0))
            .collect();
        self.recorder.lock().reads.push_back(Some(events));
    }

    pub fn failing_read(&self) {
        self.recorder.lock().reads.push_back(None);
    }
}

impl MidiTransport for ScriptedTransport {
    fn devices(&mut self) -> Result<Vec<DeviceInfo>, TransportError> {
        Ok(self.devices.clone())
    }

    fn open_input(
        &mut self,
        _handle: DeviceHandle,
        _buffer_size: usize,
    ) -> Result<Box<dyn InputStream>, TransportError> {
        Ok(Box::new(ScriptedInput {
            recorder: Arc::clone(&self.recorder),
        }))
    }

    fn open_output(
        &mut self,
        _handle: DeviceHandle,
        _buffer_size: usize,
        _latency: Duration,
    ) -> Result<Box<dyn OutputStream>, TransportError> {
        Ok(Box::new(ScriptedOutput {
            recorder: Arc::clone(&self.recorder),
        }))
    }
}

struct ScriptedInput {
    recorder: Arc<Mutex<Recorder>>,
}

impl InputStream for ScriptedInput {
    fn read(&mut self, max: usize) -> Result<Vec<RawEvent>, TransportError> {
        match self.recorder.lock().reads.pop_front() {
            Some(Some(mut events)) => {
                events.truncate(max);
                Ok(events)
            }
            Some(None) => Err(TransportError::Other("device unplugged".to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.recorder.lock().closes += 1;
        Ok(())
    }
}

struct ScriptedOutput {
    recorder: Arc<Mutex<Recorder>>,
}

impl OutputStream for ScriptedOutput {
    fn write_short(&mut self, status: u8, data1: u8, data2: u8) -> Result<(), TransportError> {
        self.recorder.lock().writes.push([status, data1, data2]);
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.recorder.lock().closes += 1;
        Ok(())
    }
}
