//! Device discovery.

use crate::error::{LaunchpadError, Result};
use crate::transport::{DeviceHandle, DeviceInfo};

/// Pick an input and an output device whose name contains `pattern`.
///
/// Every device is scanned. When several match, the last matching input and
/// the last matching output win. The two may be the same device. A missing
/// direction fails the whole discovery.
pub fn discover(devices: &[DeviceInfo], pattern: &str) -> Result<(DeviceHandle, DeviceHandle)> {
    let mut input = None;
    let mut output = None;

    for (index, device) in devices.iter().enumerate() {
        if !device.name.contains(pattern) {
            continue;
        }

        tracing::debug!(
            "Matched MIDI device #{} '{}' (input: {}, output: {})",
            index,
            device.name,
            device.input,
            device.output
        );

        if device.input {
            input = Some(DeviceHandle::new(index));
        }
        if device.output {
            output = Some(DeviceHandle::new(index));
        }
    }

    match (input, output) {
        (Some(input), Some(output)) => Ok((input, output)),
        _ => Err(LaunchpadError::DeviceNotFound {
            pattern: pattern.to_string(),
        }),
    }
}
