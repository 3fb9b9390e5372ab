//! Terrain Render Pipeline
//!
//! Draws the implicit terrain mesh straight from the height and color
//! fields. There is no vertex or index buffer: `shader.wgsl` derives every
//! vertex from `vertex_index`, six per grid cell.
//!
//! The pipeline does not check readiness. Callers only invoke [`draw`] with
//! fields that are fully submitted.
//!
//! [`draw`]: TerrainRenderPipeline::draw

use std::num::NonZeroU64;

use static_assertions::const_assert_eq;
use tracing::{debug, warn};

use crate::camera::CameraPose;
use crate::error::DeviceError;
use crate::render::binding_validator::validate_render_bindings;
use crate::render::error_scope::capture_device_errors;
use crate::render::field::TerrainFields;
use crate::render::gpu_context::DEPTH_FORMAT;
use crate::render::shader_loader::{ShaderSource, create_shader_module};
use crate::terrain::params::GRID_QUANTUM;

pub const CAMERA_UNIFORM_SIZE: usize = 32;

/// `Camera` uniform of `shader.wgsl`. Eight f32, no padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub pitch: f32,
    pub yaw: f32,
    pub aspect_ratio: f32,
    pub pos_x: f32,
    pub pos_y: f32,
    pub pos_z: f32,
    pub grid_width: f32,
    pub grid_height: f32,
}

const_assert_eq!(std::mem::size_of::<CameraUniform>(), CAMERA_UNIFORM_SIZE);

impl CameraUniform {
    pub fn new(pose: &CameraPose, aspect_ratio: f32, grid_size: u32) -> Self {
        Self {
            pitch: pose.pitch,
            yaw: pose.yaw,
            aspect_ratio,
            pos_x: pose.position.x,
            pos_y: pose.position.y,
            pos_z: pose.position.z,
            grid_width: grid_size as f32,
            grid_height: grid_size as f32,
        }
    }
}

/// Aspect ratio of the surface after flooring both sides to the grid quantum.
///
/// Returns 1.0 when the quantized height is zero (surfaces under 64 px tall).
pub fn quantized_aspect_ratio(width: u32, height: u32) -> f32 {
    let w = (width / GRID_QUANTUM * GRID_QUANTUM) as f32;
    let h = (height / GRID_QUANTUM * GRID_QUANTUM) as f32;
    if h <= 0.0 { 1.0 } else { w / h }
}

/// Vertices drawn for a `grid_size` grid: two triangles per cell.
pub fn terrain_index_count(grid_size: u32) -> u32 {
    let quads = grid_size.saturating_sub(1);
    quads * quads * 6
}

pub struct TerrainRenderPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
}

impl TerrainRenderPipeline {
    /// Build the pipeline for `color_format`. A shader that fails to compile
    /// or a layout the backend rejects (e.g. no storage buffers in the vertex
    /// stage) is reported as [`DeviceError`].
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        shader: &ShaderSource,
    ) -> Result<Self, DeviceError> {
        capture_device_errors(device, "terrain pipeline creation", || {
            Ok(Self::build(device, color_format, shader))
        })
    }

    fn build(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        shader: &ShaderSource,
    ) -> Self {
        let module = create_shader_module(device, "terrain_shader", shader);

        // @group(0) @binding(0): uniform Camera (32 B)
        // @group(0) @binding(1): storage<read> heights
        // @group(0) @binding(2): storage<read> colors
        let entries = [
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(CAMERA_UNIFORM_SIZE as u64),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ];
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain_bind_group_layout"),
            entries: &entries,
        });
        let mismatches = validate_render_bindings(&entries);
        if mismatches > 0 {
            warn!(mismatches, "terrain binding mismatches found, GPU validation errors may occur");
        }

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("terrain_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_uniform_buffer"),
            size: CAMERA_UNIFORM_SIZE as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        debug!(format = ?color_format, "terrain render pipeline created");

        Self {
            pipeline,
            bind_group_layout,
            camera_buffer,
        }
    }

    /// Record the terrain draw into `pass`.
    ///
    /// The camera uniform is staged on `queue` and lands before the pass's
    /// command buffer executes.
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        pose: &CameraPose,
        surface_size: (u32, u32),
        fields: &TerrainFields,
    ) {
        let grid_size = fields.grid_size();
        let aspect_ratio = quantized_aspect_ratio(surface_size.0, surface_size.1);
        let uniform = CameraUniform::new(pose, aspect_ratio, grid_size);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniform));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: fields.height.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: fields.color.buffer.as_entire_binding(),
                },
            ],
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..terrain_index_count(grid_size), 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_aspect_ratio_is_quantized() {
        // floor(500/64)*64 = 448, floor(130/64)*64 = 128
        assert_eq!(quantized_aspect_ratio(500, 130), 3.5);
        assert_eq!(quantized_aspect_ratio(1920, 1080), 1920.0 / 1024.0);
        assert_eq!(quantized_aspect_ratio(640, 640), 1.0);
    }

    #[test]
    fn test_aspect_ratio_degenerate_height() {
        assert_eq!(quantized_aspect_ratio(500, 63), 1.0);
        assert_eq!(quantized_aspect_ratio(500, 0), 1.0);
        assert_eq!(quantized_aspect_ratio(0, 0), 1.0);
    }

    #[test]
    fn test_index_count() {
        assert_eq!(terrain_index_count(64), 63 * 63 * 6);
        assert_eq!(terrain_index_count(1024), 1023 * 1023 * 6);
        assert_eq!(terrain_index_count(2304), 2303 * 2303 * 6);
        assert_eq!(terrain_index_count(1), 0);
        assert_eq!(terrain_index_count(0), 0);
    }

    #[test]
    fn test_camera_uniform_layout() {
        let pose = CameraPose {
            pitch: 0.25,
            yaw: -1.0,
            position: Vec3::new(1.0, 2.0, 3.0),
        };
        let uniform = CameraUniform::new(&pose, 3.5, 1024);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&uniform));
        assert_eq!(floats, &[0.25, -1.0, 3.5, 1.0, 2.0, 3.0, 1024.0, 1024.0]);
    }
}
