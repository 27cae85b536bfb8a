use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use super::core::Camera;
use crate::options::CameraOptions;

const RADIANS_PER_PIXEL: f32 = 0.01;
const MIN_POLAR: f32 = 1e-3;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;
/// Velocities below this are treated as stopped.
const REST_EPSILON: f32 = 1e-5;

/// Orbits the camera around a fixed target.
///
/// Drags accumulate angular velocity; [`update`](Self::update) applies it
/// once per frame. With damping on, the velocity decays by the damping
/// factor each frame instead of stopping dead.
#[derive(Debug, Clone)]
pub struct OrbitController {
    target: Vec3,
    distance: f32,
    /// Azimuth around +Y.
    azimuth: f32,
    /// Angle from +Y, kept inside `(0, π)`.
    polar: f32,
    velocity: Vec2,
    rotate_speed: f32,
    zoom_speed: f32,
    damping: f32,
    enable_damping: bool,
}

impl OrbitController {
    /// Controller starting from `options.position` around `options.target`.
    pub fn new(options: &CameraOptions) -> Self {
        let target = Vec3::from(options.target);
        let offset = Vec3::from(options.position) - target;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let polar = if offset.length_squared() > 0.0 {
            (offset.y / offset.length()).clamp(-1.0, 1.0).acos()
        } else {
            PI * 0.5
        };

        Self {
            target,
            distance,
            azimuth: offset.x.atan2(offset.z),
            polar: polar.clamp(MIN_POLAR, PI - MIN_POLAR),
            velocity: Vec2::ZERO,
            rotate_speed: options.rotate_speed,
            zoom_speed: options.zoom_speed,
            damping: options.damping.clamp(0.0, 1.0),
            enable_damping: options.enable_damping,
        }
    }

    /// Add a drag of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.velocity -= delta * RADIANS_PER_PIXEL * self.rotate_speed;
    }

    /// Zoom by a scroll amount (positive = closer).
    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance * (1.0 - scroll * self.zoom_speed))
            .clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Whether the orbit is still coasting.
    pub fn is_moving(&self) -> bool {
        self.velocity.length_squared() > REST_EPSILON * REST_EPSILON
    }

    /// Current distance from the target.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Apply accumulated motion and write the eye position into `camera`.
    pub fn update(&mut self, camera: &mut Camera) {
        self.azimuth += self.velocity.x;
        self.polar =
            (self.polar + self.velocity.y).clamp(MIN_POLAR, PI - MIN_POLAR);

        if self.enable_damping {
            self.velocity *= 1.0 - self.damping;
            if !self.is_moving() {
                self.velocity = Vec2::ZERO;
            }
        } else {
            self.velocity = Vec2::ZERO;
        }

        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        let offset = Vec3::new(
            sin_polar * sin_azimuth,
            cos_polar,
            sin_polar * cos_azimuth,
        ) * self.distance;

        camera.target = self.target;
        camera.eye = self.target + offset;
    }
}
