//! Fly Camera Controller
//!
//! First-person "fly" camera steered by pointer drags:
//! - Drag deltas rotate the camera directly (0.003 rad/pixel, no smoothing)
//! - Pitch clamped to ±1.57 rad
//! - While the pointer is held, each frame advances the camera 1.3 units along
//!   its view direction; release stops it instantly (no inertia)

use glam::Vec3;

/// Radians of rotation per pixel of drag.
pub const DRAG_SENSITIVITY: f32 = 0.003;
/// Pitch is clamped to ±this many radians.
pub const PITCH_LIMIT: f32 = 1.57;
/// Units advanced per frame while the pointer is held.
pub const FLY_SPEED: f32 = 1.3;
/// Where a fresh terrain instance puts the camera.
pub const START_POSITION: Vec3 = Vec3::new(0.0, 200.0, 0.0);

/// Orientation and position handed to the render pipeline each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub pitch: f32,
    pub yaw: f32,
    pub position: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            position: START_POSITION,
        }
    }
}

impl CameraPose {
    /// View direction for the current pitch/yaw, not normalized.
    ///
    /// yaw=0, pitch=0 looks toward -Z.
    #[inline]
    pub fn forward_raw(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            -self.pitch.cos() * self.yaw.cos(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct CameraController {
    pose: CameraPose,
    sensitivity: f32,
    speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            pose: CameraPose::default(),
            sensitivity: DRAG_SENSITIVITY,
            speed: FLY_SPEED,
        }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    /// Apply one drag event.
    ///
    /// Positive `dx` turns right, positive `dy` pitches up (screen-space drag
    /// down raises the view, matching the touch controls this mirrors).
    pub fn apply_drag(&mut self, dx: f32, dy: f32) {
        self.pose.yaw += dx * self.sensitivity;
        self.pose.pitch += dy * self.sensitivity;
        self.pose.pitch = self.pose.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Per-frame integration. Returns true if the camera moved.
    pub fn integrate(&mut self, pressed: bool) -> bool {
        if !pressed {
            return false;
        }
        let forward = self.pose.forward_raw();
        let len = forward.length();
        if len > 0.0 {
            self.pose.position += forward / len * self.speed;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.pose = CameraPose::default();
    }
}
