//! Frame Scheduler
//!
//! Per-frame coordination between the frame loop, the current terrain
//! instance and the camera:
//! 1. The first frame touching an instance starts its generation (once)
//! 2. While the instance is not ready, every frame is clear-only
//! 3. Once ready, every frame integrates the camera, draws, and presents
//!
//! The frame loop never waits on generation. A new parameter set replaces
//! the current instance outright.

use std::sync::Arc;

use tracing::{info, warn};

use super::instance::{FieldGenerator, GenerationState, TerrainInstance};
use super::params::{GenerationId, TerrainParameters};
use crate::camera::{CameraController, CameraPose};
use crate::error::ConfigError;

/// Receives exactly one call per frame from [`FrameScheduler::frame`].
///
/// Implementations own presentation: both methods are expected to submit
/// and present the frame they record.
pub trait FrameSink<F> {
    type Error;

    /// Clear color and depth, draw nothing, present.
    fn clear_only(&mut self) -> Result<(), Self::Error>;

    /// Draw the terrain described by `fields` from `pose`, present.
    fn draw_terrain(
        &mut self,
        pose: &CameraPose,
        params: &TerrainParameters,
        fields: &F,
    ) -> Result<(), Self::Error>;
}

/// What a frame ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Cleared,
    Rendered,
}

pub struct FrameScheduler<G: FieldGenerator> {
    generator: Arc<G>,
    current: TerrainInstance<G::Fields>,
    camera: CameraController,
}

impl<G: FieldGenerator> FrameScheduler<G> {
    /// Create the scheduler with its first (not yet started) instance.
    pub fn new(generator: Arc<G>, params: TerrainParameters) -> Result<Self, ConfigError> {
        let params = sanitize(&params)?;
        Ok(Self {
            generator,
            current: TerrainInstance::new(GenerationId(1), params),
            camera: CameraController::new(),
        })
    }

    /// Discard the current instance and queue a fresh one for `params`.
    ///
    /// The new instance starts on the next frame. The camera returns to its
    /// start pose.
    pub fn supersede(&mut self, params: TerrainParameters) -> Result<GenerationId, ConfigError> {
        let params = sanitize(&params)?;
        let id = self.current.id().next();
        info!(
            old = %self.current.id(),
            new = %id,
            state = ?self.current.state(),
            "superseding terrain instance"
        );
        self.current = TerrainInstance::new(id, params);
        self.camera.reset();
        Ok(id)
    }

    /// Run one frame. Exactly one of the sink's methods is called.
    pub fn frame<S>(&mut self, pointer_held: bool, sink: &mut S) -> Result<FrameOutcome, S::Error>
    where
        S: FrameSink<G::Fields>,
    {
        self.current.start(&self.generator);

        match self.current.ready_fields() {
            Some(fields) => {
                self.camera.integrate(pointer_held);
                sink.draw_terrain(self.camera.pose(), self.current.params(), fields)?;
                Ok(FrameOutcome::Rendered)
            }
            None => {
                sink.clear_only()?;
                Ok(FrameOutcome::Cleared)
            }
        }
    }

    /// Swap the generator used for instances that have not started yet.
    /// A running generation keeps the generator it was started with.
    pub fn set_generator(&mut self, generator: Arc<G>) {
        self.generator = generator;
    }

    pub fn generator(&self) -> &Arc<G> {
        &self.generator
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn generation_id(&self) -> GenerationId {
        self.current.id()
    }

    pub fn params(&self) -> &TerrainParameters {
        self.current.params()
    }

    pub fn state(&self) -> GenerationState {
        self.current.state()
    }

    pub fn failure(&self) -> Option<&str> {
        self.current.failure()
    }

    pub fn instance(&self) -> &TerrainInstance<G::Fields> {
        &self.current
    }
}

fn sanitize(params: &TerrainParameters) -> Result<TerrainParameters, ConfigError> {
    let sanitized = params.sanitized()?;
    if sanitized != *params {
        warn!(requested = ?params, applied = ?sanitized, "terrain parameters clamped");
    }
    Ok(sanitized)
}
