//! Turns a source mesh's vertex buffer into per-particle attribute arrays.

use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::FireworksError;

/// How sampled vertex positions are displaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadMode {
    /// Particles sit exactly on the sampled vertices.
    #[default]
    None,
    /// Each particle is pushed off its vertex by a random spherical offset.
    Spherical,
}

/// Parallel per-particle arrays, all of the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleAttributes {
    /// Particle positions in model space.
    pub positions: Vec<Vec3>,
    /// Per-particle size factor in `[0, 1)`.
    pub sizes: Vec<f32>,
    /// Per-particle animation rate in `[1, 2)`.
    pub time_multipliers: Vec<f32>,
    /// Index of the source vertex each particle was drawn from.
    pub source_indices: Vec<u32>,
}

impl ParticleAttributes {
    /// Number of particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether there are no particles.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            positions: Vec::with_capacity(n),
            sizes: Vec::with_capacity(n),
            time_multipliers: Vec::with_capacity(n),
            source_indices: Vec::with_capacity(n),
        }
    }
}

/// Samples a fixed number of particles from a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSampler {
    particle_count: usize,
    spread: SpreadMode,
    spread_radius: f32,
}

impl VertexSampler {
    /// Sampler producing `particle_count` particles per call.
    pub fn new(particle_count: usize) -> Self {
        Self {
            particle_count,
            spread: SpreadMode::None,
            spread_radius: 1.0,
        }
    }

    /// Enable a displacement mode. `radius` scales the spherical offset.
    #[must_use]
    pub fn with_spread(mut self, spread: SpreadMode, radius: f32) -> Self {
        self.spread = spread;
        self.spread_radius = radius;
        self
    }

    /// Particles produced per call.
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Draw `particle_count` particles from `vertices`.
    ///
    /// Each particle copies a uniformly chosen vertex position, then gets an
    /// independent size in `[0, 1)` and time multiplier in `[1, 2)`.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::EmptyGeometry`] when `vertices` is empty.
    pub fn sample(
        &self,
        model: &str,
        vertices: &[Vec3],
        rng: &mut impl Rng,
    ) -> Result<ParticleAttributes, FireworksError> {
        if vertices.is_empty() {
            return Err(FireworksError::EmptyGeometry {
                model: model.to_owned(),
            });
        }

        let mut out = ParticleAttributes::with_capacity(self.particle_count);
        for _ in 0..self.particle_count {
            let offset = match self.spread {
                SpreadMode::None => Vec3::ZERO,
                SpreadMode::Spherical => {
                    spherical_offset(rng) * self.spread_radius
                }
            };

            let index = rng.random_range(0..vertices.len());
            out.positions.push(vertices[index] + offset);
            out.source_indices.push(index as u32);
            out.sizes.push(rng.random::<f32>());
            out.time_multipliers.push(1.0 + rng.random::<f32>());
        }

        log::debug!(
            "sampled {} particles from {} vertices of '{model}'",
            out.len(),
            vertices.len()
        );
        Ok(out)
    }
}

/// Random point on a shell of radius `(0.5 + a) × (0.75 + 0.25 b)`, with
/// polar angle in `[0, π)` and azimuth in `[0, 2π)`.
fn spherical_offset(rng: &mut impl Rng) -> Vec3 {
    let radius =
        (0.5 + rng.random::<f32>()) * (0.75 + rng.random::<f32>() * 0.25);
    let phi = rng.random::<f32>() * PI;
    let theta = rng.random::<f32>() * PI * 2.0;

    let ring = phi.sin() * radius;
    Vec3::new(ring * theta.sin(), phi.cos() * radius, ring * theta.cos())
}
