//! Noise Field Generator
//!
//! Dispatches the noise kernel once per field. The same pipeline produces
//! both the heightfield (primary parameters) and the moisture field
//! (secondary parameters, see [`ParamVariant`]).
//!
//! Generation is fire-and-forget: the call returns once the commands are
//! submitted. Later passes that read the field are ordered by the queue.

use rand::Rng;
use tracing::debug;
use wgpu::util::DeviceExt;

use crate::error::TerrainError;
use crate::render::compute_pipelines::{ComputePipelines, workgroup_count};
use crate::render::field::FieldHandle;
use crate::terrain::codec::{ParamVariant, encode_generation_params};
use crate::terrain::params::TerrainParameters;

pub struct NoiseFieldGenerator<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    pipelines: &'a ComputePipelines,
}

impl<'a> NoiseFieldGenerator<'a> {
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

    /// Allocate a field, upload the params record and submit one dispatch
    /// covering the whole grid.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        params: &TerrainParameters,
        variant: ParamVariant,
        rng: &mut R,
    ) -> Result<FieldHandle, TerrainError> {
        let record = encode_generation_params(params, variant, rng)?;
        let label = match variant {
            ParamVariant::Primary => "height_field",
            ParamVariant::Secondary => "moisture_field",
        };

        let field = FieldHandle::allocate(self.device, label, params.grid_size)?;

        let params_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("noise_params_buffer"),
                contents: &record.to_bytes(),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("noise_field_bind_group"),
            layout: &self.pipelines.noise_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: field.buffer.as_entire_binding(),
                },
            ],
        });

        let (width, height) = params.grid_dims();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("noise_field_encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("noise_field_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.noise_pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(workgroup_count(width), workgroup_count(height), 1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        debug!(
            field = label,
            seed = record.seed,
            octaves = record.octaves,
            noise_scale = record.noise_scale,
            "noise field submitted"
        );
        Ok(field)
    }
}
