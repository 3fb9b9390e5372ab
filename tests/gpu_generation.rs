//! GPU Generation Tests - Pipelines, Field Buffers and Device Errors
//!
//! Runs the real compute path on wgpu's no-op backend, which validates every
//! call like a hardware device but executes nothing. Buffer sizes, limit
//! checks and captured device errors are observable; field contents are not.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use terrain_engine::camera::CameraPose;
use terrain_engine::error::{DeviceError, TerrainError};
use terrain_engine::render::shader_loader::embedded;
use terrain_engine::render::{
    ColorFieldGenerator, ComputePipelines, FieldHandle, GpuTerrainGenerator, NoiseFieldGenerator,
    ShaderSet, ShaderSource, TerrainFields, TerrainRenderPipeline,
};
use terrain_engine::terrain::{
    CancelToken, FieldGenerator, FrameOutcome, FrameScheduler, FrameSink, GenerationState,
    MoistureSeeding, ParamVariant, TerrainParameters, field_byte_size,
};

fn noop_device() -> (wgpu::Device, wgpu::Queue) {
    wgpu::Device::noop(&wgpu::DeviceDescriptor::default())
}

fn params(grid_size: u32) -> TerrainParameters {
    TerrainParameters {
        grid_size,
        noise_scale: 250.0,
        octaves: 8,
        persistence: 0.5,
        lacunarity: 2.0,
        seed: 42,
    }
}

/// Noise kernel whose output binding demands 8192 cells, more than a 64 grid
/// allocates. Compiles and links; fails when dispatched.
fn oversized_output_shaders() -> ShaderSet {
    let mut shaders = ShaderSet::embedded();
    shaders.compute_perlin = ShaderSource::Runtime(
        embedded::COMPUTE_PERLIN.replace("array<vec4<f32>>", "array<vec4<f32>, 8192>"),
    );
    shaders
}

#[derive(Default)]
struct CountingSink {
    cleared: usize,
    drawn: usize,
}

impl FrameSink<TerrainFields> for CountingSink {
    type Error = ();

    fn clear_only(&mut self) -> Result<(), ()> {
        self.cleared += 1;
        Ok(())
    }

    fn draw_terrain(
        &mut self,
        _pose: &CameraPose,
        _params: &TerrainParameters,
        _fields: &TerrainFields,
    ) -> Result<(), ()> {
        self.drawn += 1;
        Ok(())
    }
}

// ============================================================================
// Pipeline creation
// ============================================================================

#[test]
fn test_compute_pipelines_build_from_embedded_shaders() {
    let (device, _queue) = noop_device();
    assert!(ComputePipelines::new(&device, &ShaderSet::embedded()).is_ok());
}

#[test]
fn test_invalid_compute_shader_is_a_device_error() {
    let (device, _queue) = noop_device();
    let mut shaders = ShaderSet::embedded();
    shaders.compute_perlin = ShaderSource::Runtime("this is not wgsl".to_string());

    let result = ComputePipelines::new(&device, &shaders);
    assert!(matches!(
        result,
        Err(DeviceError::Validation {
            stage: "compute pipeline creation",
            ..
        })
    ));

    // The device stays usable after a rejected pipeline.
    assert!(ComputePipelines::new(&device, &ShaderSet::embedded()).is_ok());
}

#[test]
fn test_invalid_terrain_shader_is_a_device_error() {
    let (device, _queue) = noop_device();
    let shader = ShaderSource::Runtime("fn vs( {".to_string());

    let result = TerrainRenderPipeline::new(&device, wgpu::TextureFormat::Rgba8Unorm, &shader);
    assert!(matches!(
        result,
        Err(DeviceError::Validation {
            stage: "terrain pipeline creation",
            ..
        })
    ));
}

// ============================================================================
// Field generation
// ============================================================================

#[test]
fn test_noise_field_buffer_matches_grid() {
    let (device, queue) = noop_device();
    let pipelines = ComputePipelines::new(&device, &ShaderSet::embedded()).unwrap();
    let noise = NoiseFieldGenerator::new(&device, &queue, &pipelines);
    let mut rng = StdRng::seed_from_u64(1);

    for grid in [64, 192, 512] {
        let field = noise
            .generate(&params(grid), ParamVariant::Primary, &mut rng)
            .unwrap();
        assert_eq!(field.grid_size, grid);
        assert_eq!(field.buffer.size(), u64::from(grid) * u64::from(grid) * 16);
    }
}

#[test]
fn test_color_field_follows_input_grid() {
    let (device, queue) = noop_device();
    let pipelines = ComputePipelines::new(&device, &ShaderSet::embedded()).unwrap();
    let height = FieldHandle::allocate(&device, "height", 128).unwrap();
    let moisture = FieldHandle::allocate(&device, "moisture", 128).unwrap();

    let color = ColorFieldGenerator::new(&device, &queue, &pipelines)
        .generate((128, 128), &height, &moisture)
        .unwrap();
    assert_eq!(color.grid_size, 128);
    assert_eq!(color.buffer.size(), field_byte_size(128));
}

#[test]
fn test_generation_allocates_three_full_fields() {
    let (device, queue) = noop_device();
    let pipelines = Arc::new(ComputePipelines::new(&device, &ShaderSet::embedded()).unwrap());
    let generator = GpuTerrainGenerator::new(device, queue, pipelines, MoistureSeeding::Derived);

    let fields = generator.generate(&params(128), &CancelToken::new()).unwrap();
    let expected = 128 * 128 * 16;
    assert_eq!(fields.grid_size(), 128);
    assert_eq!(fields.height.buffer.size(), expected);
    assert_eq!(fields.moisture.buffer.size(), expected);
    assert_eq!(fields.color.buffer.size(), expected);
}

#[test]
fn test_allocation_respects_storage_binding_limit() {
    let (device, _queue) = wgpu::Device::noop(&wgpu::DeviceDescriptor {
        required_limits: wgpu::Limits {
            max_storage_buffer_binding_size: 1 << 20,
            ..wgpu::Limits::default()
        },
        ..Default::default()
    });

    // 256^2 * 16 B is exactly 1 MiB.
    assert!(FieldHandle::allocate(&device, "fits", 256).is_ok());
    assert!(matches!(
        FieldHandle::allocate(&device, "too_big", 512),
        Err(DeviceError::BufferTooLarge {
            requested: 4_194_304,
            limit: 1_048_576,
        })
    ));
}

#[test]
fn test_cancelled_generation_stops_between_passes() {
    let (device, queue) = noop_device();
    let pipelines = Arc::new(ComputePipelines::new(&device, &ShaderSet::embedded()).unwrap());
    let generator = GpuTerrainGenerator::new(device, queue, pipelines, MoistureSeeding::Derived);

    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(matches!(
        generator.generate(&params(64), &cancel),
        Err(TerrainError::Cancelled)
    ));
}

// ============================================================================
// Device errors during generation
// ============================================================================

#[test]
fn test_dispatch_validation_error_is_captured() {
    let (device, queue) = noop_device();
    let pipelines = Arc::new(ComputePipelines::new(&device, &oversized_output_shaders()).unwrap());
    let generator = GpuTerrainGenerator::new(device, queue, pipelines, MoistureSeeding::Derived);

    let result = generator.generate(&params(64), &CancelToken::new());
    assert!(matches!(
        result,
        Err(TerrainError::Device(DeviceError::Validation {
            stage: "terrain generation",
            ..
        }))
    ));
}

#[test]
fn test_device_error_leaves_instance_generating() {
    let (device, queue) = noop_device();
    let pipelines = Arc::new(ComputePipelines::new(&device, &oversized_output_shaders()).unwrap());
    let generator = GpuTerrainGenerator::new(device, queue, pipelines, MoistureSeeding::Derived);
    let mut scheduler = FrameScheduler::new(Arc::new(generator), params(64)).unwrap();
    let mut sink = CountingSink::default();

    scheduler.frame(false, &mut sink).unwrap();
    let deadline = Instant::now() + Duration::from_secs(10);
    while !scheduler.instance().is_settled() {
        assert!(Instant::now() < deadline, "generation worker did not finish");
        std::thread::sleep(Duration::from_millis(1));
    }

    for _ in 0..3 {
        assert_eq!(scheduler.frame(true, &mut sink).unwrap(), FrameOutcome::Cleared);
    }
    assert_eq!(scheduler.state(), GenerationState::Generating);
    assert_eq!(sink.drawn, 0);
    assert_eq!(sink.cleared, 4);
    assert!(scheduler.failure().is_some_and(|msg| msg.contains("validation")));
}
