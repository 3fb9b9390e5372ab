//! Render Module
//!
//! wgpu side of the terrain engine: device and surface management, the two
//! compute pipelines that build the fields, and the render pipeline that
//! draws them.

pub mod binding_validator;
pub mod color_field;
pub mod compute_pipelines;
pub mod error_scope;
pub mod field;
pub mod generator;
pub mod gpu_context;
pub mod noise_field;
pub mod presenter;
pub mod shader_loader;
pub mod terrain_pipeline;

pub use color_field::ColorFieldGenerator;
pub use compute_pipelines::{ComputePipelines, WORKGROUP_SIZE, workgroup_count};
pub use error_scope::capture_device_errors;
pub use field::{FieldHandle, TerrainFields};
pub use generator::GpuTerrainGenerator;
pub use gpu_context::{DEPTH_FORMAT, GpuContext, GpuContextConfig};
pub use noise_field::NoiseFieldGenerator;
pub use presenter::{CLEAR_COLOR, SurfaceFrameSink};
pub use shader_loader::{ShaderSet, ShaderSource, create_shader_module, load_shader_file};
pub use terrain_pipeline::{
    CameraUniform, TerrainRenderPipeline, quantized_aspect_ratio, terrain_index_count,
};
