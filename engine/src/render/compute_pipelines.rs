//! Compute Pipeline Infrastructure
//!
//! Creates the two compute pipelines used by terrain generation:
//! - Noise field: fractal Perlin noise into a 16 B/cell storage buffer
//! - Color field: height + moisture fields into a per-cell color field
//!
//! Both are built once per device and shared by every terrain instance.

use std::num::NonZeroU64;

use tracing::warn;

use crate::error::DeviceError;
use crate::render::binding_validator::validate_compute_bindings;
use crate::render::error_scope::capture_device_errors;
use crate::render::shader_loader::{ShaderSet, create_shader_module};
use crate::terrain::codec::{GENERATION_PARAMS_SIZE, GRID_DIMS_SIZE};

/// Workgroup edge length declared by both compute kernels (`@workgroup_size(8, 8, 1)`).
pub const WORKGROUP_SIZE: u32 = 8;

/// Number of workgroups along one axis covering `cells` cells.
#[inline]
pub fn workgroup_count(cells: u32) -> u32 {
    cells.div_ceil(WORKGROUP_SIZE)
}

/// Holds both compute pipelines and their bind group layouts.
pub struct ComputePipelines {
    /// Noise pipeline: writes one normalized sample per cell.
    pub noise_pipeline: wgpu::ComputePipeline,
    pub noise_bind_group_layout: wgpu::BindGroupLayout,

    /// Color pipeline: reads height + moisture, writes color.
    pub color_pipeline: wgpu::ComputePipeline,
    pub color_bind_group_layout: wgpu::BindGroupLayout,
}

fn uniform_entry(binding: u32, size: usize) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl ComputePipelines {
    /// Create both compute pipelines from the given shader artifacts.
    ///
    /// Shader compilation and pipeline validation failures come back as
    /// [`DeviceError`] instead of reaching the device's uncaptured handler.
    pub fn new(device: &wgpu::Device, shaders: &ShaderSet) -> Result<Self, DeviceError> {
        capture_device_errors(device, "compute pipeline creation", || {
            Ok(Self::build(device, shaders))
        })
    }

    fn build(device: &wgpu::Device, shaders: &ShaderSet) -> Self {
        let noise_module = create_shader_module(device, "compute_perlin", &shaders.compute_perlin);
        let color_module = create_shader_module(
            device,
            "compute_noise_to_colors",
            &shaders.compute_noise_to_colors,
        );

        // --- Noise Field ---
        // @group(0) @binding(0): uniform NoiseParams (28 B)
        // @group(0) @binding(1): storage<read_write> output
        let noise_entries = [
            uniform_entry(0, GENERATION_PARAMS_SIZE),
            storage_entry(1, false),
        ];
        let noise_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("noise_field_bind_group_layout"),
                entries: &noise_entries,
            });

        let noise_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("noise_field_pipeline_layout"),
            bind_group_layouts: &[&noise_bind_group_layout],
            push_constant_ranges: &[],
        });

        let noise_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("noise_field_pipeline"),
            layout: Some(&noise_pipeline_layout),
            module: &noise_module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        // --- Color Field ---
        // @group(0) @binding(0): uniform GridDims (8 B)
        // @group(0) @binding(1): storage<read> heights
        // @group(0) @binding(2): storage<read_write> colors
        // @group(0) @binding(3): storage<read> moisture
        let color_entries = [
            uniform_entry(0, GRID_DIMS_SIZE),
            storage_entry(1, true),
            storage_entry(2, false),
            storage_entry(3, true),
        ];
        let color_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("color_field_bind_group_layout"),
                entries: &color_entries,
            });

        let color_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("color_field_pipeline_layout"),
            bind_group_layouts: &[&color_bind_group_layout],
            push_constant_ranges: &[],
        });

        let color_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("color_field_pipeline"),
            layout: Some(&color_pipeline_layout),
            module: &color_module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let mismatches = validate_compute_bindings(&noise_entries, &color_entries);
        if mismatches > 0 {
            warn!(mismatches, "compute binding mismatches found, GPU validation errors may occur");
        }

        Self {
            noise_pipeline,
            noise_bind_group_layout,
            color_pipeline,
            color_bind_group_layout,
        }
    }
}
