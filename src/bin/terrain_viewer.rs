//! Terrain Viewer
//!
//! Run with: `cargo run --bin terrain-viewer [config.json]`
//!
//! Generates a procedural terrain on the GPU and flies a camera over it.
//!
//! Controls:
//! - Left-drag: Look around; holding the button flies forward
//! - R: New random seed (regenerates immediately)
//! - +/-: Grid size (step 64)
//! - [ / ]: Octaves
//! - , / .: Noise scale
//! - ; / ': Persistence
//! - 9 / 0: Lacunarity
//! - M: Toggle moisture seeding (independent / derived from seed)
//! - Enter: Regenerate with the pending parameters
//! - ESC: Exit

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use terrain_engine::config::ViewerConfig;
use terrain_engine::error::TerrainError;
use terrain_engine::input::DragState;
use terrain_engine::render::{
    ComputePipelines, GpuContext, GpuContextConfig, GpuTerrainGenerator, ShaderSet,
    SurfaceFrameSink, TerrainRenderPipeline,
};
use terrain_engine::terrain::params::{
    GRID_QUANTUM, GRID_SIZE_RANGE, LACUNARITY_RANGE, OCTAVES_RANGE, PERSISTENCE_RANGE,
    SCALE_RANGE,
};
use terrain_engine::terrain::{
    FrameOutcome, FrameScheduler, GenerationState, MoistureSeeding, TerrainParameters,
};

const DEFAULT_LOG_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn";

// ============================================================================
// APPLICATION STATE
// ============================================================================

struct AppState {
    window: Arc<Window>,
    gpu: GpuContext,
    terrain_pipeline: TerrainRenderPipeline,
    scheduler: FrameScheduler<GpuTerrainGenerator>,
    drag: DragState,
    /// Edited by the keyboard, adopted on confirm.
    pending: TerrainParameters,
    pending_seeding: MoistureSeeding,
    base_title: String,
    title: String,
}

impl AppState {
    fn new(window: Arc<Window>, config: &ViewerConfig) -> Result<Self, TerrainError> {
        let gpu = GpuContext::new(
            Arc::clone(&window),
            &GpuContextConfig {
                vsync: config.window.vsync,
                ..Default::default()
            },
        )?;

        let shaders = ShaderSet::resolve(config.shader_dir.as_deref())?;
        let pipelines = Arc::new(ComputePipelines::new(&gpu.device, &shaders)?);
        let terrain_pipeline =
            TerrainRenderPipeline::new(&gpu.device, gpu.format(), &shaders.terrain)?;

        let generator = GpuTerrainGenerator::new(
            gpu.device.clone(),
            gpu.queue.clone(),
            pipelines,
            config.moisture_seeding,
        );
        let scheduler = FrameScheduler::new(Arc::new(generator), config.terrain)?;
        let pending = *scheduler.params();

        Ok(Self {
            window,
            gpu,
            terrain_pipeline,
            scheduler,
            drag: DragState::new(),
            pending,
            pending_seeding: config.moisture_seeding,
            base_title: config.window.title.clone(),
            title: String::new(),
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size.width, size.height);
    }

    fn render(&mut self) -> Result<FrameOutcome, wgpu::SurfaceError> {
        let mut sink = SurfaceFrameSink::new(&self.gpu, &self.terrain_pipeline);
        self.scheduler.frame(self.drag.is_dragging(), &mut sink)
    }

    /// Adopt the pending parameters as a new terrain instance.
    fn confirm(&mut self) {
        if self.pending_seeding != self.scheduler.generator().moisture_seeding() {
            let generator = self
                .scheduler
                .generator()
                .with_moisture_seeding(self.pending_seeding);
            self.scheduler.set_generator(Arc::new(generator));
        }
        match self.scheduler.supersede(self.pending) {
            Ok(id) => {
                self.pending = *self.scheduler.params();
                info!(generation = %id, params = ?self.pending, "regenerating terrain");
            }
            Err(e) => warn!(error = %e, "rejected terrain parameters"),
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let p = &mut self.pending;
        match key {
            KeyCode::KeyR => {
                p.seed = rand::random();
                self.confirm();
                return;
            }
            KeyCode::Enter | KeyCode::NumpadEnter => {
                self.confirm();
                return;
            }
            KeyCode::Equal | KeyCode::NumpadAdd => {
                p.grid_size = step_grid(p.grid_size, 1);
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                p.grid_size = step_grid(p.grid_size, -1);
            }
            KeyCode::BracketRight => {
                p.octaves = (p.octaves + 1).min(OCTAVES_RANGE.max as i32);
            }
            KeyCode::BracketLeft => {
                p.octaves = (p.octaves - 1).max(OCTAVES_RANGE.min as i32);
            }
            KeyCode::Period => p.noise_scale = SCALE_RANGE.clamp(p.noise_scale + 10.0),
            KeyCode::Comma => p.noise_scale = SCALE_RANGE.clamp(p.noise_scale - 10.0),
            KeyCode::Quote => p.persistence = PERSISTENCE_RANGE.clamp(p.persistence + 0.05),
            KeyCode::Semicolon => p.persistence = PERSISTENCE_RANGE.clamp(p.persistence - 0.05),
            KeyCode::Digit0 => p.lacunarity = LACUNARITY_RANGE.clamp(p.lacunarity + 0.1),
            KeyCode::Digit9 => p.lacunarity = LACUNARITY_RANGE.clamp(p.lacunarity - 0.1),
            KeyCode::KeyM => self.pending_seeding = self.pending_seeding.toggled(),
            _ => return,
        }
        debug!(
            pending = ?self.pending,
            seeding = ?self.pending_seeding,
            "pending parameters changed"
        );
    }

    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button != MouseButton::Left {
            return;
        }
        if pressed {
            self.drag.press();
        } else {
            self.drag.release();
        }
    }

    fn handle_mouse_move(&mut self, x: f64, y: f64) {
        if let Some((dx, dy)) = self.drag.cursor_moved(x, y) {
            self.scheduler.camera_mut().apply_drag(dx, dy);
        }
    }

    fn update_title(&mut self) {
        let state = match self.scheduler.state() {
            GenerationState::NotStarted => "queued",
            GenerationState::Generating if self.scheduler.failure().is_some() => "FAILED",
            GenerationState::Generating => "generating",
            GenerationState::Ready => "ready",
        };
        let current = self.scheduler.params();
        let mut title = format!(
            "{} | {} {} | grid {} seed {}",
            self.base_title,
            self.scheduler.generation_id(),
            state,
            current.grid_size,
            current.seed
        );
        if self.pending != *current
            || self.pending_seeding != self.scheduler.generator().moisture_seeding()
        {
            title.push_str(&format!(
                " | pending: grid {} scale {:.0} oct {} pers {:.2} lac {:.1} moisture {:?} (Enter)",
                self.pending.grid_size,
                self.pending.noise_scale,
                self.pending.octaves,
                self.pending.persistence,
                self.pending.lacunarity,
                self.pending_seeding
            ));
        }
        if let Some(failure) = self.scheduler.failure() {
            title.push_str(&format!(" | {failure}"));
        }

        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }
}

fn step_grid(grid_size: u32, steps: i32) -> u32 {
    let next = grid_size as i64 + steps as i64 * GRID_QUANTUM as i64;
    next.clamp(GRID_SIZE_RANGE.min as i64, GRID_SIZE_RANGE.max as i64) as u32
}

// ============================================================================
// APPLICATION HANDLER
// ============================================================================

struct App {
    config: ViewerConfig,
    state: Option<AppState>,
    exit_code: ExitCode,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_code = ExitCode::FAILURE;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!(error = %e, "failed to create window");
                self.fail(event_loop);
                return;
            }
        };

        match AppState::new(window, &self.config) {
            Ok(state) => {
                info!("ready: left-drag to look and fly, R for a new seed, Enter to apply edits, ESC to exit");
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                error!(error = %e, "failed to initialize terrain viewer");
                self.fail(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                state.resize(new_size);
            }
            WindowEvent::Focused(false) | WindowEvent::CursorLeft { .. } => {
                state.drag.release();
            }
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if key_state != ElementState::Pressed {
                    return;
                }
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                // Auto-repeat is fine for the steppers, not for regeneration.
                if repeat && matches!(key, KeyCode::KeyR | KeyCode::Enter | KeyCode::KeyM) {
                    return;
                }
                state.handle_key(key);
            }
            WindowEvent::MouseInput { button, state: btn_state, .. } => {
                state.handle_mouse_button(button, btn_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.handle_mouse_move(position.x, position.y);
            }
            WindowEvent::RedrawRequested => {
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.gpu.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory");
                        self.exit_code = ExitCode::FAILURE;
                        event_loop.exit();
                        return;
                    }
                    Err(e) => warn!(error = ?e, "frame skipped"),
                }

                state.update_title();
                state.window.request_redraw();
            }
            _ => {}
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match ViewerConfig::load_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!(error = %e, "failed to create event loop");
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        config,
        state: None,
        exit_code: ExitCode::SUCCESS,
    };
    if let Err(e) = event_loop.run_app(&mut app) {
        error!(error = %e, "event loop terminated with an error");
        return ExitCode::FAILURE;
    }
    app.exit_code
}
