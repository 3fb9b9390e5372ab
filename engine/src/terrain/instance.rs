//! Terrain Instance
//!
//! One generation run: its parameters, the fields it produced, and a
//! write-once readiness cell shared between the frame loop and the
//! background worker that runs the compute passes.
//!
//! State only moves forward: `NotStarted -> Generating -> Ready`. A failed
//! run stays in `Generating` and records its error; the frame loop keeps
//! issuing clear-only frames for it.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use super::params::{GenerationId, TerrainParameters};
use crate::error::{DeviceError, TerrainError};

/// Produces the three device-resident fields for one parameter set.
///
/// Implementations run on the generation worker thread and must not touch
/// the frame loop. `cancel` should be polled between passes.
pub trait FieldGenerator: Send + Sync + 'static {
    type Fields: Send + Sync + 'static;

    fn generate(
        &self,
        params: &TerrainParameters,
        cancel: &CancelToken,
    ) -> Result<Self::Fields, TerrainError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum GenerationState {
    NotStarted = 0,
    Generating = 1,
    Ready = 2,
}

/// Single-writer readiness cell. Transitions are monotonic.
#[derive(Debug)]
pub struct ReadinessCell(AtomicU8);

impl ReadinessCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(GenerationState::NotStarted as u8))
    }

    pub fn state(&self) -> GenerationState {
        match self.0.load(Ordering::Acquire) {
            0 => GenerationState::NotStarted,
            1 => GenerationState::Generating,
            _ => GenerationState::Ready,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == GenerationState::Ready
    }

    /// `NotStarted -> Generating`. Returns false if the run already started.
    pub fn begin(&self) -> bool {
        self.0
            .compare_exchange(
                GenerationState::NotStarted as u8,
                GenerationState::Generating as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// `Generating -> Ready`. Returns false from any other state.
    pub fn finish(&self) -> bool {
        self.0
            .compare_exchange(
                GenerationState::Generating as u8,
                GenerationState::Ready as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for ReadinessCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative cancellation flag handed to the generator.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once cancelled, for use with `?` between passes.
    pub fn check(&self) -> Result<(), TerrainError> {
        if self.is_cancelled() {
            Err(TerrainError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// State shared with the worker thread.
struct Shared<F> {
    readiness: ReadinessCell,
    fields: OnceLock<F>,
    failure: OnceLock<String>,
    cancel: CancelToken,
}

/// A terrain instance owns its fields exclusively; dropping it releases them.
pub struct TerrainInstance<F: Send + Sync + 'static> {
    id: GenerationId,
    params: TerrainParameters,
    shared: Arc<Shared<F>>,
    worker: Option<JoinHandle<()>>,
}

impl<F: Send + Sync + 'static> TerrainInstance<F> {
    pub fn new(id: GenerationId, params: TerrainParameters) -> Self {
        Self {
            id,
            params,
            shared: Arc::new(Shared {
                readiness: ReadinessCell::new(),
                fields: OnceLock::new(),
                failure: OnceLock::new(),
                cancel: CancelToken::new(),
            }),
            worker: None,
        }
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    pub fn params(&self) -> &TerrainParameters {
        &self.params
    }

    pub fn state(&self) -> GenerationState {
        self.shared.readiness.state()
    }

    /// Fields, only once the instance is ready.
    pub fn ready_fields(&self) -> Option<&F> {
        if self.shared.readiness.is_ready() {
            self.shared.fields.get()
        } else {
            None
        }
    }

    /// Error message of a run that aborted; the instance never becomes ready.
    pub fn failure(&self) -> Option<&str> {
        self.shared.failure.get().map(String::as_str)
    }

    /// Start generation exactly once. Later calls are no-ops.
    pub fn start<G>(&mut self, generator: &Arc<G>)
    where
        G: FieldGenerator<Fields = F>,
    {
        if !self.shared.readiness.begin() {
            return;
        }
        info!(
            id = %self.id,
            grid = self.params.grid_size,
            seed = self.params.seed,
            "terrain generation started"
        );

        let shared = Arc::clone(&self.shared);
        let generator = Arc::clone(generator);
        let params = self.params;
        let id = self.id;

        let spawned = thread::Builder::new()
            .name(format!("terrain-gen-{}", id.0))
            .spawn(move || generation_worker(id, params, generator, shared));

        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                let err = TerrainError::from(DeviceError::WorkerSpawn(e));
                error!(id = %self.id, error = %err, "terrain generation could not start");
                let _ = self.shared.failure.set(err.to_string());
            }
        }
    }

    /// Whether the background worker has exited (or never ran).
    pub fn is_settled(&self) -> bool {
        self.worker.as_ref().is_none_or(|w| w.is_finished())
    }
}

impl<F: Send + Sync + 'static> Drop for TerrainInstance<F> {
    fn drop(&mut self) {
        // The worker is detached, not joined: the frame loop never waits on it.
        self.shared.cancel.cancel();
        if self.worker.take().is_some() {
            debug!(id = %self.id, "terrain instance released");
        }
    }
}

fn generation_worker<G: FieldGenerator>(
    id: GenerationId,
    params: TerrainParameters,
    generator: Arc<G>,
    shared: Arc<Shared<G::Fields>>,
) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(cores) = core_affinity::get_core_ids()
            && cores.len() > 1
        {
            let _ = core_affinity::set_for_current(cores[1]);
        }
    }

    match generator.generate(&params, &shared.cancel) {
        Ok(fields) => {
            if shared.cancel.is_cancelled() {
                debug!(id = %id, "discarding fields of superseded terrain instance");
                return;
            }
            // Publish the fields before the flag so a ready reader always finds them.
            if shared.fields.set(fields).is_ok() && shared.readiness.finish() {
                info!(id = %id, "terrain generation complete");
            }
        }
        Err(TerrainError::Cancelled) => {
            debug!(id = %id, "terrain generation cancelled");
        }
        Err(err) => {
            error!(id = %id, error = %err, "terrain generation failed");
            let _ = shared.failure.set(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_transitions_are_monotonic() {
        let cell = ReadinessCell::new();
        assert_eq!(cell.state(), GenerationState::NotStarted);
        assert!(!cell.finish());
        assert!(cell.begin());
        assert!(!cell.begin());
        assert_eq!(cell.state(), GenerationState::Generating);
        assert!(cell.finish());
        assert!(cell.is_ready());
        assert!(!cell.finish());
        assert!(!cell.begin());
        assert_eq!(cell.state(), GenerationState::Ready);
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(token.check().is_ok());
        other.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(TerrainError::Cancelled)));
    }

    #[test]
    fn test_new_instance_has_no_fields() {
        let instance: TerrainInstance<u32> =
            TerrainInstance::new(GenerationId(3), TerrainParameters::default());
        assert_eq!(instance.state(), GenerationState::NotStarted);
        assert!(instance.ready_fields().is_none());
        assert!(instance.failure().is_none());
        assert!(instance.is_settled());
    }
}
