//! Owns the set of active instances from registration to release.
//!
//! Each instance moves `Spawned -> Animating -> Completed` exactly once.
//! On completion it leaves the active set and its GPU resources are
//! released in the same step, so nothing with `progress == 1` is ever
//! drawn.

use std::time::Duration;

use web_time::Instant;

use super::assembler::AssembledEffect;
use super::backend::EffectBackend;
use super::instance::{InstanceId, LifecycleState, ParticleInstance};
use crate::animation::progress::checked_duration;
use crate::animation::{AnimationTick, ProgressAnimator};
use crate::error::FireworksError;

/// An instance that is animating and drawn.
struct ActiveEffect<R> {
    instance: ParticleInstance,
    resources: R,
    animator: ProgressAnimator,
}

/// Record of an instance that finished this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedEffect {
    /// Instance id.
    pub id: InstanceId,
    /// Model the instance was sampled from.
    pub model: String,
    /// Final state, always [`LifecycleState::Completed`].
    pub state: LifecycleState,
}

/// Active-set owner and per-frame driver.
pub struct LifecycleManager<R> {
    active: Vec<ActiveEffect<R>>,
    duration: Duration,
}

impl<R> LifecycleManager<R> {
    /// Manager animating every instance over `duration_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidDuration`] for a non-positive or
    /// non-finite duration.
    pub fn new(duration_secs: f32) -> Result<Self, FireworksError> {
        Ok(Self {
            active: Vec::new(),
            duration: checked_duration(duration_secs)?,
        })
    }

    /// Animation duration applied to new instances.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Add an assembled instance to the active set and start its animation
    /// at `now`.
    pub fn register(
        &mut self,
        effect: AssembledEffect<R>,
        now: Instant,
    ) -> InstanceId {
        let AssembledEffect {
            mut instance,
            resources,
        } = effect;

        instance.state = LifecycleState::Animating;
        instance.params.progress = 0.0;
        let id = instance.id;

        let animator =
            ProgressAnimator::from_checked(self.duration, now);
        self.active.push(ActiveEffect {
            instance,
            resources,
            animator,
        });
        log::debug!("registered {id} ({} active)", self.active.len());
        id
    }

    /// Advance every active instance to `now`.
    ///
    /// Running instances get their progress pushed to the GPU; instances
    /// that reached 1 are removed and released before this returns.
    pub fn tick<B>(
        &mut self,
        backend: &mut B,
        now: Instant,
    ) -> Vec<CompletedEffect>
    where
        B: EffectBackend<Resources = R>,
    {
        let mut any_done = false;
        for effect in &mut self.active {
            match effect.animator.update(now) {
                AnimationTick::Running(progress) => {
                    effect.instance.params.progress = progress;
                    backend.write_params(
                        &effect.instance,
                        &mut effect.resources,
                    );
                }
                AnimationTick::Completed | AnimationTick::Finished => {
                    effect.instance.params.progress = 1.0;
                    any_done = true;
                }
            }
        }

        if !any_done {
            return Vec::new();
        }

        let (done, still_active): (Vec<_>, Vec<_>) = self
            .active
            .drain(..)
            .partition(|effect| effect.animator.is_finished());
        self.active = still_active;

        done.into_iter()
            .map(|effect| {
                let ActiveEffect {
                    mut instance,
                    resources,
                    ..
                } = effect;
                instance.state = LifecycleState::Completed;
                backend.release(resources);
                log::debug!(
                    "retired {} ({} active)",
                    instance.id,
                    self.active.len()
                );
                CompletedEffect {
                    id: instance.id,
                    model: instance.model,
                    state: instance.state,
                }
            })
            .collect()
    }

    /// Instances to draw this frame, in registration order.
    pub fn drawable(&self) -> impl Iterator<Item = (&ParticleInstance, &R)> {
        self.active
            .iter()
            .map(|effect| (&effect.instance, &effect.resources))
    }

    /// Look up an active instance.
    pub fn get(&self, id: InstanceId) -> Option<&ParticleInstance> {
        self.active
            .iter()
            .find(|effect| effect.instance.id == id)
            .map(|effect| &effect.instance)
    }

    /// Whether `id` is currently active.
    pub fn contains(&self, id: InstanceId) -> bool {
        self.get(id).is_some()
    }

    /// Number of active instances.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether nothing is animating.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::effect::assembler::{EffectAssembler, TextureSelection};
    use crate::effect::instance::Placement;
    use crate::effect::sampler::VertexSampler;
    use crate::effect::testing::{RecordedEffect, RecordingBackend};
    use crate::viewport::Viewport;

    struct Fixture {
        backend: RecordingBackend,
        manager: LifecycleManager<RecordedEffect>,
        assembler: EffectAssembler,
        viewport: Viewport,
        rng: StdRng,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                backend: RecordingBackend::default(),
                manager: LifecycleManager::new(3.0)
                    .unwrap(),
                assembler: EffectAssembler::new(
                    8,
                    TextureSelection::Uniform,
                    0.1,
                    0.2,
                    Placement::default(),
                )
                .unwrap(),
                viewport: Viewport::new(800, 600, 1.0, 2.0),
                rng: StdRng::seed_from_u64(21),
            }
        }

        fn spawn(&mut self, now: Instant) -> InstanceId {
            let attributes = VertexSampler::new(16)
                .sample("cube", &[Vec3::X, Vec3::Y], &mut self.rng)
                .unwrap();
            let effect = self.assembler.assemble(
                "cube",
                attributes,
                self.viewport.resolution_handle(),
                &mut self.rng,
                &mut self.backend,
            );
            self.manager.register(effect, now)
        }
    }

    #[test]
    fn registered_instances_are_drawable() {
        let mut fx = Fixture::new();
        let now = Instant::now();
        let id = fx.spawn(now);

        assert!(fx.manager.contains(id));
        let (instance, _) = fx.manager.drawable().next().unwrap();
        assert_eq!(instance.state(), LifecycleState::Animating);
        assert_eq!(instance.progress(), 0.0);
    }

    #[test]
    fn progress_follows_wall_clock() {
        let mut fx = Fixture::new();
        let start = Instant::now();
        let id = fx.spawn(start);

        let done = fx
            .manager
            .tick(&mut fx.backend, start + Duration::from_millis(1500));
        assert!(done.is_empty());

        let instance = fx.manager.get(id).unwrap();
        assert!((instance.progress() - 0.5).abs() < 1e-3);
        let (_, resources) = fx.manager.drawable().next().unwrap();
        assert!((resources.last_progress - 0.5).abs() < 1e-3);
    }

    #[test]
    fn completion_removes_and_releases_once() {
        let mut fx = Fixture::new();
        let start = Instant::now();
        let id = fx.spawn(start);
        assert_eq!(fx.backend.live_count(), 1);

        let done = fx
            .manager
            .tick(&mut fx.backend, start + Duration::from_secs(3));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, id);
        assert_eq!(done[0].state, LifecycleState::Completed);

        assert!(!fx.manager.contains(id));
        assert_eq!(fx.manager.drawable().count(), 0);
        assert_eq!(fx.backend.live_count(), 0);
        assert_eq!(fx.backend.released, vec![0]);

        // Later ticks neither report nor release it again.
        let again = fx
            .manager
            .tick(&mut fx.backend, start + Duration::from_secs(5));
        assert!(again.is_empty());
        assert_eq!(fx.backend.released.len(), 1);
    }

    #[test]
    fn staggered_instances_retire_independently() {
        let mut fx = Fixture::new();
        let start = Instant::now();
        let first = fx.spawn(start);
        let second = fx.spawn(start + Duration::from_secs(2));

        let done = fx
            .manager
            .tick(&mut fx.backend, start + Duration::from_millis(3100));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, first);
        assert!(fx.manager.contains(second));
        assert!(fx.backend.is_live(1));
        assert!(!fx.backend.is_live(0));

        let done = fx
            .manager
            .tick(&mut fx.backend, start + Duration::from_secs(5));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, second);
        assert!(fx.manager.is_empty());
        assert_eq!(fx.backend.live_count(), 0);
    }

    #[test]
    fn nothing_drawn_at_full_progress() {
        let mut fx = Fixture::new();
        let start = Instant::now();
        for i in 0..10 {
            let _ = fx.spawn(start + Duration::from_millis(i * 400));
        }
        for step in 0..40 {
            let now = start + Duration::from_millis(step * 150);
            let _ = fx.manager.tick(&mut fx.backend, now);
            assert!(fx.manager.drawable().all(|(i, _)| i.progress() < 1.0));
            assert_eq!(fx.manager.len(), fx.backend.live_count());
        }
    }

    #[test]
    fn invalid_duration_fails_fast() {
        let result =
            LifecycleManager::<RecordedEffect>::new(0.0);
        assert!(matches!(result, Err(FireworksError::InvalidDuration(_))));
    }
}
