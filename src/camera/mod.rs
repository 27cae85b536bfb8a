//! Perspective camera and orbit controls.

/// Orbit controller with optional damping.
pub mod controller;
/// Core camera struct and matrices.
pub mod core;

pub use controller::OrbitController;
pub use self::core::Camera;
