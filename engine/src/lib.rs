//! Terrain Engine Library
//!
//! GPU procedural terrain: compute passes synthesize a heightfield, a
//! moisture field and a per-cell color field; a render pipeline draws an
//! implicit mesh straight from those fields; a frame scheduler starts each
//! generation exactly once and gates rendering on its readiness.
//!
//! # Modules
//!
//! - [`terrain`] - Parameters, GPU parameter records, terrain instances and the frame scheduler
//! - [`render`] - wgpu device/surface, compute and render pipelines, field generators
//! - [`camera`] - First-person fly camera steered by drag input
//! - [`input`] - Pointer drag tracking
//! - [`config`] - Viewer configuration file
//! - [`error`] - Error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use terrain_engine::render::{ComputePipelines, GpuTerrainGenerator, ShaderSet};
//! use terrain_engine::terrain::{FrameScheduler, MoistureSeeding, TerrainParameters};
//!
//! let shaders = ShaderSet::embedded();
//! let pipelines = Arc::new(ComputePipelines::new(&device, &shaders)?);
//! let generator = GpuTerrainGenerator::new(device, queue, pipelines, MoistureSeeding::Derived);
//! let mut scheduler = FrameScheduler::new(Arc::new(generator), TerrainParameters::default())?;
//!
//! // Each display refresh:
//! scheduler.frame(drag.is_dragging(), &mut SurfaceFrameSink::new(&gpu, &terrain_pipeline))?;
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod terrain;

pub use config::ViewerConfig;
pub use error::{ConfigError, DeviceError, EncodingError, TerrainError};
