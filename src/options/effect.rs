use serde::{Deserialize, Serialize};

use crate::animation::progress::checked_duration;
use crate::effect::{Placement, SpreadMode, TextureSelection};
use crate::error::FireworksError;

/// Per-effect sampling, appearance, and timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectOptions {
    /// Particles sampled per effect.
    pub particle_count: usize,
    /// Seconds from spawn to retirement.
    pub duration_secs: f32,
    /// Lower bound of the random base point size.
    pub base_size_min: f32,
    /// Upper bound (exclusive) of the random base point size.
    pub base_size_max: f32,
    /// How each effect picks its sprite.
    pub texture_selection: TextureSelection,
    /// Optional offset applied to sampled positions.
    pub spread: SpreadMode,
    /// Scale of the spherical spread.
    pub spread_radius: f32,
    /// World position of every effect.
    pub position: [f32; 3],
    /// XYZ Euler rotation (radians) of every effect.
    pub rotation: [f32; 3],
}

impl EffectOptions {
    /// Placement transform built from `position` and `rotation`.
    pub fn placement(&self) -> Placement {
        Placement {
            position: self.position.into(),
            rotation: self.rotation.into(),
        }
    }

    pub(super) fn validate(&self) -> Result<(), FireworksError> {
        let _ = checked_duration(self.duration_secs)?;
        if self.particle_count == 0 {
            return Err(FireworksError::InvalidOptions(
                "effect.particle_count must be at least 1".into(),
            ));
        }
        if !(self.base_size_min.is_finite()
            && self.base_size_max.is_finite()
            && 0.0 <= self.base_size_min
            && self.base_size_min <= self.base_size_max)
        {
            return Err(FireworksError::InvalidOptions(format!(
                "effect base size range [{}, {}) is invalid",
                self.base_size_min, self.base_size_max
            )));
        }
        if !self.spread_radius.is_finite() || self.spread_radius < 0.0 {
            return Err(FireworksError::InvalidOptions(format!(
                "effect.spread_radius must be non-negative, got {}",
                self.spread_radius
            )));
        }
        Ok(())
    }
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            particle_count: 9000,
            duration_secs: 3.0,
            base_size_min: 0.1,
            base_size_max: 0.2,
            texture_selection: TextureSelection::Uniform,
            spread: SpreadMode::None,
            spread_radius: 1.0,
            position: [-3.4, 0.0, 0.0],
            rotation: [1.7, 0.0, 0.0],
        }
    }
}
