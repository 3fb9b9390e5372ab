//! Device Error Capture
//!
//! wgpu reports validation and out-of-memory failures through the device
//! rather than the call that caused them. Outside an error scope they reach
//! the uncaptured-error handler, which panics by default.

use crate::error::DeviceError;

/// Run `f` inside validation and out-of-memory error scopes.
///
/// A captured device error takes precedence over whatever `f` returned.
pub fn capture_device_errors<T, E>(
    device: &wgpu::Device,
    stage: &'static str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<DeviceError>,
{
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let result = f();
    // Scopes pop in reverse push order.
    let oom = pollster::block_on(device.pop_error_scope());
    let validation = pollster::block_on(device.pop_error_scope());

    if let Some(err) = oom {
        return Err(DeviceError::OutOfMemory {
            stage,
            message: err.to_string(),
        }
        .into());
    }
    if let Some(err) = validation {
        return Err(DeviceError::Validation {
            stage,
            message: err.to_string(),
        }
        .into());
    }
    result
}
