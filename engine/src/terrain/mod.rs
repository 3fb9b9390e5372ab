//! Terrain Module
//!
//! GPU-independent core of terrain generation: parameters, the binary
//! records uploaded to the compute kernels, terrain instances with their
//! readiness tracking, and the per-frame scheduler.

pub mod codec;
pub mod instance;
pub mod params;
pub mod scheduler;

pub use codec::{
    GpuGenerationParams, GpuGridDims, MoistureSeeding, ParamVariant, encode_generation_params,
    encode_grid_dims,
};
pub use instance::{CancelToken, FieldGenerator, GenerationState, ReadinessCell, TerrainInstance};
pub use params::{GenerationId, ParamRange, TerrainParameters, field_byte_size};
pub use scheduler::{FrameOutcome, FrameScheduler, FrameSink};
