//! GPU Terrain Generator
//!
//! [`FieldGenerator`] backed by the compute pipelines: two noise passes
//! (height, moisture) followed by the color pass. Runs on the instance's
//! worker thread with cloned device/queue handles.

use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, info_span};

use crate::error::TerrainError;
use crate::render::color_field::ColorFieldGenerator;
use crate::render::compute_pipelines::ComputePipelines;
use crate::render::error_scope::capture_device_errors;
use crate::render::field::TerrainFields;
use crate::render::noise_field::NoiseFieldGenerator;
use crate::terrain::codec::{MoistureSeeding, ParamVariant};
use crate::terrain::instance::{CancelToken, FieldGenerator};
use crate::terrain::params::TerrainParameters;

/// Mixed into the public seed for [`MoistureSeeding::Derived`] so the
/// moisture RNG stream is not the same stream a caller seeding from the
/// public seed would get.
const MOISTURE_SEED_SALT: u64 = 0x6d6f_6973_7475_7265;

pub struct GpuTerrainGenerator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: Arc<ComputePipelines>,
    moisture: MoistureSeeding,
}

impl GpuTerrainGenerator {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        pipelines: Arc<ComputePipelines>,
        moisture: MoistureSeeding,
    ) -> Self {
        Self {
            device,
            queue,
            pipelines,
            moisture,
        }
    }

    /// Same device and pipelines, different moisture seeding.
    pub fn with_moisture_seeding(&self, moisture: MoistureSeeding) -> Self {
        Self {
            device: self.device.clone(),
            queue: self.queue.clone(),
            pipelines: Arc::clone(&self.pipelines),
            moisture,
        }
    }

    pub fn moisture_seeding(&self) -> MoistureSeeding {
        self.moisture
    }

    fn moisture_rng(&self, params: &TerrainParameters) -> StdRng {
        moisture_rng(self.moisture, params.seed)
    }

    fn run_passes(
        &self,
        params: &TerrainParameters,
        cancel: &CancelToken,
    ) -> Result<TerrainFields, TerrainError> {
        let noise = NoiseFieldGenerator::new(&self.device, &self.queue, &self.pipelines);
        let mut rng = self.moisture_rng(params);

        let height = noise.generate(params, ParamVariant::Primary, &mut rng)?;
        cancel.check()?;
        let moisture = noise.generate(params, ParamVariant::Secondary, &mut rng)?;
        cancel.check()?;

        let color = ColorFieldGenerator::new(&self.device, &self.queue, &self.pipelines)
            .generate(params.grid_dims(), &height, &moisture)?;

        Ok(TerrainFields {
            height,
            moisture,
            color,
        })
    }
}

pub(crate) fn moisture_rng(seeding: MoistureSeeding, seed: i32) -> StdRng {
    match seeding {
        MoistureSeeding::Independent => StdRng::from_entropy(),
        MoistureSeeding::Derived => {
            StdRng::seed_from_u64(u64::from(seed as u32) ^ MOISTURE_SEED_SALT)
        }
    }
}

impl FieldGenerator for GpuTerrainGenerator {
    type Fields = TerrainFields;

    fn generate(
        &self,
        params: &TerrainParameters,
        cancel: &CancelToken,
    ) -> Result<TerrainFields, TerrainError> {
        let _span = info_span!("generate", grid = params.grid_size, seed = params.seed).entered();
        let started = Instant::now();

        let fields = capture_device_errors(&self.device, "terrain generation", || {
            self.run_passes(params, cancel)
        })?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            moisture = ?self.moisture,
            "terrain fields submitted"
        );
        Ok(fields)
    }
}
