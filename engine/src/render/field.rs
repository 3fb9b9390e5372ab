//! GPU Field Buffers
//!
//! A field is a `grid_size x grid_size` storage buffer of `vec4<f32>` cells
//! (16 bytes each, row-major, index = y * grid_size + x).

use tracing::debug;

use crate::error::DeviceError;
use crate::terrain::params::field_byte_size;

/// An immutable handle to a generated field.
///
/// Cloning is cheap; the underlying buffer is shared.
#[derive(Clone, Debug)]
pub struct FieldHandle {
    pub buffer: wgpu::Buffer,
    pub grid_size: u32,
}

impl FieldHandle {
    /// Allocate an uninitialized field for `grid_size`.
    ///
    /// Fails before touching the device when the buffer would exceed the
    /// storage binding limit.
    pub fn allocate(
        device: &wgpu::Device,
        label: &str,
        grid_size: u32,
    ) -> Result<Self, DeviceError> {
        let size = field_byte_size(grid_size);
        check_binding_size(size, device.limits().max_storage_buffer_binding_size as u64)?;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        debug!(label, grid_size, bytes = size, "allocated field buffer");
        Ok(Self { buffer, grid_size })
    }
}

pub(crate) fn check_binding_size(requested: u64, limit: u64) -> Result<(), DeviceError> {
    if requested > limit {
        return Err(DeviceError::BufferTooLarge { requested, limit });
    }
    Ok(())
}

/// Everything the render pipeline needs for one terrain instance.
#[derive(Clone, Debug)]
pub struct TerrainFields {
    pub height: FieldHandle,
    pub moisture: FieldHandle,
    pub color: FieldHandle,
}

impl TerrainFields {
    pub fn grid_size(&self) -> u32 {
        self.height.grid_size
    }
}
