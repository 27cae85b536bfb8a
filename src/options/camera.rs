use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Camera projection and orbit control parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Initial eye position.
    pub position: [f32; 3],
    /// Point the camera orbits around.
    pub target: [f32; 3],
    /// Rotation sensitivity multiplier.
    pub rotate_speed: f32,
    /// Zoom sensitivity multiplier.
    pub zoom_speed: f32,
    /// Fraction of orbit velocity shed per frame when damping is on.
    pub damping: f32,
    /// Keep orbiting briefly after the drag ends.
    pub enable_damping: bool,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 75.0,
            znear: 0.1,
            zfar: 100.0,
            position: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            rotate_speed: 0.5,
            zoom_speed: 0.1,
            damping: 0.05,
            enable_damping: true,
        }
    }
}
