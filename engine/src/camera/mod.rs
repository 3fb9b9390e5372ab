//! Camera Module
//!
//! Window-system agnostic camera state and math.

pub mod controller;

pub use controller::{
    CameraController, CameraPose, DRAG_SENSITIVITY, FLY_SPEED, PITCH_LIMIT, START_POSITION,
};
