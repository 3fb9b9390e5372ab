//! Color Field Generator
//!
//! Maps each (height, moisture) cell pair to a biome color. Must be issued
//! after both input fields are submitted; the single in-order queue then
//! guarantees the kernel sees their final contents.

use tracing::debug;
use wgpu::util::DeviceExt;

use crate::error::TerrainError;
use crate::render::compute_pipelines::{ComputePipelines, workgroup_count};
use crate::render::field::FieldHandle;
use crate::terrain::codec::encode_grid_dims;

pub struct ColorFieldGenerator<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    pipelines: &'a ComputePipelines,
}

impl<'a> ColorFieldGenerator<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        pipelines: &'a ComputePipelines,
    ) -> Self {
        Self {
            device,
            queue,
            pipelines,
        }
    }

    pub fn generate(
        &self,
        grid_dims: (u32, u32),
        height: &FieldHandle,
        moisture: &FieldHandle,
    ) -> Result<FieldHandle, TerrainError> {
        let (width, depth) = grid_dims;
        let color = FieldHandle::allocate(self.device, "color_field", width)?;

        let dims_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("grid_dims_buffer"),
                contents: &encode_grid_dims(width, depth).to_bytes(),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("color_field_bind_group"),
            layout: &self.pipelines.color_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: dims_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: height.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: color.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: moisture.buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("color_field_encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("color_field_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.color_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(workgroup_count(width), workgroup_count(depth), 1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        debug!(width, height = depth, "color field submitted");
        Ok(color)
    }
}
