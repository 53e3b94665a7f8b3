//! Driver for 8x8 Launchpad-style MIDI grid controllers.
//!
//! This crate provides:
//! - Device discovery by port name
//! - Translation between pad notes and grid coordinates
//! - Pad presses as a polled read or a continuous async stream
//! - Two-channel (green/red) LED control per pad
//!
//! # Grid Layout
//!
//! Pads are addressed as `(x, y)` with `(0, 0)` at the bottom-left.
//! The device numbers its pads row by row from the top with a stride of 16:
//!
//! ```text
//! y=7:   0   1   2   3   4   5   6   7
//! y=6:  16  17  18  19  20  21  22  23
//! ...
//! y=0: 112 113 114 115 116 117 118 119
//! ```
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> launchpad::Result<()> {
//! let mut pad = launchpad::Launchpad::new()?;
//! pad.reset()?;
//! let mut hits = pad.listen()?;
//! while let Some(hit) = hits.next().await {
//!     pad.light(hit.x, hit.y, launchpad::intensity::FULL, launchpad::intensity::OFF)?;
//! }
//! pad.cleanup()
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod listener;
pub mod transport;

pub use codec::{intensity, Hit, ShortMessage};
pub use config::{ConfigError, LaunchpadConfig};
pub use driver::Launchpad;
pub use error::{LaunchpadError, Result, TransportError};
pub use listener::{HitStream, TryRecvError};
pub use transport::{
    DeviceHandle, DeviceInfo, InputStream, MidiTransport, MidirTransport, OutputStream, RawEvent,
};
