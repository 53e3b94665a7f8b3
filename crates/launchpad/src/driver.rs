//! Launchpad driver.
//!
//! Owns one input and one output stream. Every call goes straight to the
//! transport; no device state is cached.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::codec::{self, Hit, ShortMessage};
use crate::config::LaunchpadConfig;
use crate::discovery::discover;
use crate::error::{LaunchpadError, Result};
use crate::listener::{read_hits, HitStream, Listener, SharedInput};
use crate::transport::{DeviceInfo, MidiTransport, MidirTransport, OutputStream};

/// An open Launchpad.
///
/// Reading has a single-reader discipline: while [`Launchpad::listen`] is
/// active, [`Launchpad::read`] fails with [`LaunchpadError::ReadPathBusy`].
pub struct Launchpad {
    input: SharedInput,
    output: Box<dyn OutputStream>,
    config: LaunchpadConfig,
    listener: Option<Listener>,
}

impl Launchpad {
    /// Open a Launchpad through midir with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(LaunchpadConfig::default())
    }

    /// Open a Launchpad through midir.
    pub fn with_config(config: LaunchpadConfig) -> Result<Self> {
        Self::open(&mut MidirTransport::new(), config)
    }

    /// Discover the device on `transport` and open both streams.
    ///
    /// Either both streams are open on return or neither is.
    pub fn open<T>(transport: &mut T, config: LaunchpadConfig) -> Result<Self>
    where
        T: MidiTransport + ?Sized,
    {
        config.validate()?;

        let devices = transport.devices().map_err(LaunchpadError::Enumerate)?;
        let (input_handle, output_handle) = discover(&devices, &config.device_name)?;

        let mut input = transport
            .open_input(input_handle, config.input_buffer_size)
            .map_err(|source| LaunchpadError::StreamOpen {
                direction: "input",
                source,
            })?;

        let output = match transport.open_output(
            output_handle,
            config.output_buffer_size,
            config.output_latency(),
        ) {
            Ok(output) => output,
            Err(source) => {
                if let Err(e) = input.close() {
                    tracing::warn!("Failed to close input after output open failed: {}", e);
                }
                return Err(LaunchpadError::StreamOpen {
                    direction: "output",
                    source,
                });
            }
        };

        tracing::info!(
            "Launchpad connected (input: {}, output: {})",
            device_name(&devices, input_handle.index()),
            device_name(&devices, output_handle.index())
        );

        Ok(Self {
            input: Arc::new(Mutex::new(input)),
            output,
            config,
            listener: None,
        })
    }

    pub fn config(&self) -> &LaunchpadConfig {
        &self.config
    }

    /// Read pending presses, up to the configured batch size.
    ///
    /// Returns an empty list when nothing was pressed.
    pub fn read(&self) -> Result<Vec<Hit>> {
        if self.is_listening() {
            return Err(LaunchpadError::ReadPathBusy);
        }
        read_hits(&self.input, self.config.read_batch_size)
    }

    /// Start delivering presses continuously on a background task.
    ///
    /// Must be called from within a tokio runtime. Read errors inside the
    /// loop are logged and skipped; use [`Launchpad::read`] when they matter.
    pub fn listen(&mut self) -> Result<HitStream> {
        if self.is_listening() {
            return Err(LaunchpadError::AlreadyListening);
        }

        let (listener, hits) = Listener::spawn(
            Arc::clone(&self.input),
            self.config.read_batch_size,
            self.config.poll_interval(),
            self.config.delivery_capacity,
        )?;
        self.listener = Some(listener);
        Ok(hits)
    }

    /// Stop the background listener, if any, and hand reading back.
    ///
    /// The hit stream ends, including a delivery still waiting on the consumer.
    pub fn stop_listening(&mut self) -> bool {
        match self.listener.take() {
            Some(listener) => {
                listener.stop();
                true
            }
            None => false,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listener
            .as_ref()
            .is_some_and(|listener| !listener.is_finished())
    }

    /// Set the LED of pad `(x, y)` to the given green and red intensities.
    ///
    /// See [`crate::intensity`] for the levels the device understands.
    pub fn light(&mut self, x: u8, y: u8, green: u8, red: u8) -> Result<()> {
        self.send(codec::encode_light(x, y, green, red))
    }

    /// Turn off every LED.
    pub fn reset(&mut self) -> Result<()> {
        self.send(codec::encode_reset())
    }

    /// Stop listening and close both streams.
    ///
    /// Both closes are always attempted; the first failure is returned.
    pub fn cleanup(&mut self) -> Result<()> {
        self.stop_listening();

        let input_result = self.input.lock().close();
        let output_result = self.output.close();

        if let Err(e) = &input_result {
            tracing::warn!("Failed to close input stream: {}", e);
        }
        if let Err(e) = &output_result {
            tracing::warn!("Failed to close output stream: {}", e);
        }

        input_result.map_err(|source| LaunchpadError::StreamClose {
            direction: "input",
            source,
        })?;
        output_result.map_err(|source| LaunchpadError::StreamClose {
            direction: "output",
            source,
        })
    }

    fn send(&mut self, message: ShortMessage) -> Result<()> {
        self.output
            .write_short(message.status, message.data1, message.data2)
            .map_err(LaunchpadError::TransportWrite)
    }
}

fn device_name(devices: &[DeviceInfo], index: usize) -> &str {
    devices.get(index).map_or("?", |device| device.name.as_str())
}
