//! One firework: immutable particle data, shader parameters, placement.

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::color::FireworkColor;
use super::sampler::ParticleAttributes;
use crate::viewport::ResolutionHandle;

/// Unique id assigned to each assembled instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index into the fixed sprite texture set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureIndex(pub usize);

/// Where an instance stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Assembled with GPU resources, not yet drawn.
    Spawned,
    /// Registered, animating, and drawn every frame.
    Animating,
    /// Progress reached 1; removed and released.
    Completed,
}

/// Fixed placement applied to the whole instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Translation in world space.
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
}

impl Placement {
    /// Model matrix: rotate, then translate.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }
}

/// Per-instance shader parameter set.
///
/// `resolution` is a handle onto the show-wide value, not a copy.
#[derive(Debug, Clone)]
pub struct ShaderParams {
    /// Base point size.
    pub base_size: f32,
    /// Shared device-pixel resolution. The particle pass uploads it into
    /// the frame uniform from a drawn instance's handle.
    pub resolution: ResolutionHandle,
    /// Sprite used for every particle.
    pub texture: TextureIndex,
    /// Tint.
    pub color: FireworkColor,
    /// Animation progress in `[0, 1]`. Written only from the instance's
    /// progress animator.
    pub progress: f32,
}

/// A fully assembled firework.
#[derive(Debug, Clone)]
pub struct ParticleInstance {
    pub(crate) id: InstanceId,
    pub(crate) model: String,
    pub(crate) attributes: ParticleAttributes,
    pub(crate) params: ShaderParams,
    pub(crate) placement: Placement,
    pub(crate) state: LifecycleState,
}

impl ParticleInstance {
    /// Instance id.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Model the particles were sampled from.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Immutable per-particle attributes.
    pub fn attributes(&self) -> &ParticleAttributes {
        &self.attributes
    }

    /// Number of particles.
    pub fn particle_count(&self) -> usize {
        self.attributes.len()
    }

    /// Shader parameters.
    pub fn params(&self) -> &ShaderParams {
        &self.params
    }

    /// Current progress.
    pub fn progress(&self) -> f32 {
        self.params.progress
    }

    /// Placement transform.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }
}
