//! Builds renderable instances from sampled particle data.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::backend::EffectBackend;
use super::color::FireworkColor;
use super::instance::{
    InstanceId, LifecycleState, ParticleInstance, Placement, ShaderParams,
    TextureIndex,
};
use super::sampler::ParticleAttributes;
use crate::error::FireworksError;
use crate::viewport::ResolutionHandle;

/// How an instance picks its sprite texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureSelection {
    /// Always the first texture.
    First,
    /// Uniformly random across the whole set.
    #[default]
    Uniform,
}

/// An assembled instance plus the GPU resources allocated for it.
///
/// Not yet registered for animation or drawing.
#[derive(Debug)]
pub struct AssembledEffect<R> {
    /// CPU-side instance.
    pub instance: ParticleInstance,
    /// GPU-side resources, released exactly once by the lifecycle manager.
    pub resources: R,
}

/// Turns sampled particles into a drawable [`ParticleInstance`].
#[derive(Debug, Clone)]
pub struct EffectAssembler {
    texture_count: usize,
    selection: TextureSelection,
    base_size_min: f32,
    base_size_max: f32,
    placement: Placement,
    next_id: u64,
}

impl EffectAssembler {
    /// Assembler choosing from `texture_count` sprites with base sizes in
    /// `[base_size_min, base_size_max)`.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidOptions`] for an empty texture set or
    /// an inverted or non-finite size range.
    pub fn new(
        texture_count: usize,
        selection: TextureSelection,
        base_size_min: f32,
        base_size_max: f32,
        placement: Placement,
    ) -> Result<Self, FireworksError> {
        if texture_count == 0 {
            return Err(FireworksError::InvalidOptions(
                "texture set is empty".into(),
            ));
        }
        if !(base_size_min.is_finite()
            && base_size_max.is_finite()
            && base_size_min <= base_size_max)
        {
            return Err(FireworksError::InvalidOptions(format!(
                "base size range [{base_size_min}, {base_size_max}) is invalid"
            )));
        }

        Ok(Self {
            texture_count,
            selection,
            base_size_min,
            base_size_max,
            placement,
            next_id: 0,
        })
    }

    /// Number of sprites to choose from.
    pub fn texture_count(&self) -> usize {
        self.texture_count
    }

    /// Assemble an instance with `progress = 0` and allocate its GPU
    /// resources through `backend`.
    pub fn assemble<B: EffectBackend>(
        &mut self,
        model: &str,
        attributes: ParticleAttributes,
        resolution: ResolutionHandle,
        rng: &mut impl Rng,
        backend: &mut B,
    ) -> AssembledEffect<B::Resources> {
        let texture = self.pick_texture(rng);
        let color = FireworkColor::random(rng);
        let base_size = self.pick_base_size(rng);

        let id = InstanceId(self.next_id);
        self.next_id += 1;

        let instance = ParticleInstance {
            id,
            model: model.to_owned(),
            attributes,
            params: ShaderParams {
                base_size,
                resolution,
                texture,
                color,
                progress: 0.0,
            },
            placement: self.placement,
            state: LifecycleState::Spawned,
        };

        let resources = backend.allocate(&instance);
        log::debug!(
            "assembled {id} from '{model}': {} particles, sprite {}, hue {:.3}",
            instance.particle_count(),
            texture.0,
            color.hue
        );

        AssembledEffect {
            instance,
            resources,
        }
    }

    fn pick_texture(&self, rng: &mut impl Rng) -> TextureIndex {
        match self.selection {
            TextureSelection::First => TextureIndex(0),
            TextureSelection::Uniform => {
                TextureIndex(rng.random_range(0..self.texture_count))
            }
        }
    }

    fn pick_base_size(&self, rng: &mut impl Rng) -> f32 {
        if self.base_size_min < self.base_size_max {
            rng.random_range(self.base_size_min..self.base_size_max)
        } else {
            self.base_size_min
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::effect::testing::RecordingBackend;
    use crate::viewport::Viewport;

    fn assembler(selection: TextureSelection) -> EffectAssembler {
        EffectAssembler::new(8, selection, 0.1, 0.2, Placement::default())
            .unwrap()
    }

    fn attributes() -> ParticleAttributes {
        ParticleAttributes {
            positions: vec![Vec3::ONE; 3],
            sizes: vec![0.5; 3],
            time_multipliers: vec![1.5; 3],
            source_indices: vec![0; 3],
        }
    }

    #[test]
    fn assembled_instance_starts_at_zero() {
        let viewport = Viewport::new(800, 600, 1.0, 2.0);
        let mut backend = RecordingBackend::default();
        let mut rng = StdRng::seed_from_u64(11);

        let effect = assembler(TextureSelection::Uniform).assemble(
            "papa.glb",
            attributes(),
            viewport.resolution_handle(),
            &mut rng,
            &mut backend,
        );

        let instance = &effect.instance;
        assert_eq!(instance.progress(), 0.0);
        assert_eq!(instance.state(), LifecycleState::Spawned);
        assert_eq!(instance.model(), "papa.glb");
        assert_eq!(instance.particle_count(), 3);
        assert!((0.1..0.2).contains(&instance.params().base_size));
        assert_eq!(backend.live_count(), 1);
        assert_eq!(effect.resources.particles, 3);
    }

    #[test]
    fn ids_are_unique() {
        let viewport = Viewport::new(800, 600, 1.0, 2.0);
        let mut backend = RecordingBackend::default();
        let mut rng = StdRng::seed_from_u64(12);
        let mut assembler = assembler(TextureSelection::Uniform);

        let a = assembler.assemble(
            "a",
            attributes(),
            viewport.resolution_handle(),
            &mut rng,
            &mut backend,
        );
        let b = assembler.assemble(
            "b",
            attributes(),
            viewport.resolution_handle(),
            &mut rng,
            &mut backend,
        );
        assert_ne!(a.instance.id(), b.instance.id());
    }

    #[test]
    fn uniform_selection_covers_the_set() {
        let assembler = assembler(TextureSelection::Uniform);
        let mut rng = StdRng::seed_from_u64(13);
        let mut seen = [false; 8];
        for _ in 0..1000 {
            let TextureIndex(i) = assembler.pick_texture(&mut rng);
            assert!(i < 8);
            seen[i] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn first_selection_is_always_zero() {
        let assembler = assembler(TextureSelection::First);
        let mut rng = StdRng::seed_from_u64(14);
        for _ in 0..100 {
            assert_eq!(assembler.pick_texture(&mut rng), TextureIndex(0));
        }
    }

    #[test]
    fn resolution_is_shared_not_copied() {
        let mut viewport = Viewport::new(800, 600, 1.0, 2.0);
        let mut backend = RecordingBackend::default();
        let mut rng = StdRng::seed_from_u64(15);

        let effect = assembler(TextureSelection::Uniform).assemble(
            "a",
            attributes(),
            viewport.resolution_handle(),
            &mut rng,
            &mut backend,
        );
        let _ = viewport.resize(1024, 768, 1.0);
        assert_eq!(
            effect.instance.params().resolution.get(),
            glam::Vec2::new(1024.0, 768.0)
        );
    }

    #[test]
    fn invalid_configuration_rejected() {
        assert!(EffectAssembler::new(
            0,
            TextureSelection::Uniform,
            0.1,
            0.2,
            Placement::default()
        )
        .is_err());
        assert!(EffectAssembler::new(
            8,
            TextureSelection::Uniform,
            0.3,
            0.2,
            Placement::default()
        )
        .is_err());
    }
}
