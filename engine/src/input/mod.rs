//! Input Module
//!
//! Platform-agnostic pointer input. Decoupled from winit so the viewer
//! (or a test) feeds it raw events.

pub mod drag;

pub use drag::DragState;
