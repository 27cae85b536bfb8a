//! The firework show: the explicit context that ties spawning, loading,
//! animation, and the viewport together.
//!
//! A host owns one [`FireworkShow`] and drives it from its render tick:
//!
//! 1. input handlers call [`FireworkShow::trigger`] and
//!    [`FireworkShow::resize`];
//! 2. once per frame the host calls [`FireworkShow::tick`] with its GPU
//!    backend and the current instant;
//! 3. the host draws [`FireworkShow::drawable`].
//!
//! Everything runs on the host's thread. The only asynchronous step is
//! geometry loading, which the [`GeometrySource`] resolves on a later tick.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use web_time::Instant;

use crate::effect::{
    CompletedEffect, EffectAssembler, EffectBackend, InstanceId,
    LifecycleManager, ModelCursor, ParticleInstance, SpawnScheduler,
    SpawnTicket, VertexSampler,
};
use crate::error::FireworksError;
use crate::loader::GeometrySource;
use crate::options::Options;
use crate::viewport::{ResolutionHandle, Viewport};

/// Running totals for a show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShowStats {
    /// Instances registered.
    pub spawned: u64,
    /// Instances that ran to completion and were released.
    pub completed: u64,
    /// Spawn attempts dropped (load failure, empty geometry, cap).
    pub failed: u64,
    /// Instances currently animating.
    pub active: usize,
}

/// What happened during one [`FireworkShow::tick`].
#[derive(Debug, Default)]
pub struct TickReport {
    /// Instances registered this tick.
    pub spawned: Vec<InstanceId>,
    /// Instances retired this tick.
    pub completed: Vec<CompletedEffect>,
    /// Spawn attempts dropped this tick.
    pub failed: Vec<(SpawnTicket, FireworksError)>,
}

/// Top-level show state.
///
/// `S` is the geometry source, `R` the per-instance GPU resources of the
/// backend passed to [`tick`](Self::tick).
pub struct FireworkShow<S, R> {
    scheduler: SpawnScheduler,
    sampler: VertexSampler,
    assembler: EffectAssembler,
    lifecycle: LifecycleManager<R>,
    source: S,
    viewport: Viewport,
    rng: StdRng,
    max_active: Option<usize>,
    pending: FxHashSet<u64>,
    stats: ShowStats,
}

impl<S: GeometrySource, R> FireworkShow<S, R> {
    /// Build a show from validated options.
    ///
    /// # Errors
    ///
    /// Fails with the first validation error in `options`; no show state is
    /// created in that case.
    pub fn new(
        options: &Options,
        viewport: Viewport,
        source: S,
    ) -> Result<Self, FireworksError> {
        options.validate()?;

        let cursor = ModelCursor::new(options.show.models.clone())?;
        let effect = &options.effect;
        let sampler = VertexSampler::new(effect.particle_count)
            .with_spread(effect.spread, effect.spread_radius);
        let assembler = EffectAssembler::new(
            options.show.textures.len(),
            effect.texture_selection,
            effect.base_size_min,
            effect.base_size_max,
            effect.placement(),
        )?;
        let lifecycle =
            LifecycleManager::new(effect.duration_secs)?;

        let rng = match options.show.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        log::info!(
            "show ready: {} models, {} sprites, {} particles per effect",
            cursor.models().len(),
            assembler.texture_count(),
            sampler.particle_count()
        );

        Ok(Self {
            scheduler: SpawnScheduler::new(cursor),
            sampler,
            assembler,
            lifecycle,
            source,
            viewport,
            rng,
            max_active: options.show.max_active,
            pending: FxHashSet::default(),
            stats: ShowStats::default(),
        })
    }

    /// Handle one trigger event: pick the next model, advance the cursor,
    /// and request the model's geometry.
    ///
    /// The instance appears on a later [`tick`](Self::tick), once the
    /// geometry has arrived.
    pub fn trigger(&mut self) -> SpawnTicket {
        let ticket = self.scheduler.trigger();
        log::debug!("trigger #{} -> '{}'", ticket.id, ticket.model);
        let _ = self.pending.insert(ticket.id);
        self.source.request(ticket.clone());
        ticket
    }

    /// Apply a resize. Every live instance observes the new resolution
    /// through its shared handle.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
    ) -> Vec2 {
        self.viewport.resize(width, height, device_pixel_ratio)
    }

    /// Advance the show to `now`.
    ///
    /// Resolved loads are turned into instances first, then every active
    /// instance is animated and finished ones are released. Spawn failures
    /// are logged and reported but never abort the tick.
    pub fn tick<B>(&mut self, backend: &mut B, now: Instant) -> TickReport
    where
        B: EffectBackend<Resources = R>,
    {
        let mut report = TickReport::default();

        for loaded in self.source.poll() {
            if !self.pending.remove(&loaded.ticket.id) {
                log::warn!(
                    "ignoring geometry for unknown ticket #{}",
                    loaded.ticket.id
                );
                continue;
            }

            let result = loaded.result.and_then(|vertices| {
                self.spawn_from(&loaded.ticket.model, &vertices, backend, now)
            });
            match result {
                Ok(id) => report.spawned.push(id),
                Err(e) => {
                    log::warn!("spawn #{} dropped: {e}", loaded.ticket.id);
                    self.stats.failed += 1;
                    report.failed.push((loaded.ticket, e));
                }
            }
        }

        report.completed = self.lifecycle.tick(backend, now);
        self.stats.completed += report.completed.len() as u64;
        self.stats.active = self.lifecycle.len();
        report
    }

    /// Sample `vertices`, assemble an instance, and register it at `now`.
    ///
    /// This is the synchronous half of a spawn; [`tick`](Self::tick) calls
    /// it when a load resolves. Hosts that already hold geometry may call it
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::EmptyGeometry`] for an empty vertex buffer
    /// and [`FireworksError::SpawnLimit`] when the active cap is reached.
    /// Nothing is allocated or registered on error.
    pub fn spawn_from<B>(
        &mut self,
        model: &str,
        vertices: &[Vec3],
        backend: &mut B,
        now: Instant,
    ) -> Result<InstanceId, FireworksError>
    where
        B: EffectBackend<Resources = R>,
    {
        if let Some(max) = self.max_active {
            if self.lifecycle.len() >= max {
                return Err(FireworksError::SpawnLimit(max));
            }
        }

        let attributes = self.sampler.sample(model, vertices, &mut self.rng)?;
        let effect = self.assembler.assemble(
            model,
            attributes,
            self.viewport.resolution_handle(),
            &mut self.rng,
            backend,
        );
        let id = self.lifecycle.register(effect, now);
        self.stats.spawned += 1;
        self.stats.active = self.lifecycle.len();
        Ok(id)
    }

    /// Instances to draw this frame, with their backend resources.
    pub fn drawable(&self) -> impl Iterator<Item = (&ParticleInstance, &R)> {
        self.lifecycle.drawable()
    }

    /// Resolution handle of the first drawn instance, or `None` when
    /// nothing is on screen. Every instance holds the same shared value.
    pub fn drawn_resolution(&self) -> Option<&ResolutionHandle> {
        self.drawable()
            .next()
            .map(|(instance, _)| &instance.params().resolution)
    }

    /// Look up a live instance.
    pub fn instance(&self, id: InstanceId) -> Option<&ParticleInstance> {
        self.lifecycle.get(id)
    }

    /// Number of animating instances.
    pub fn active_count(&self) -> usize {
        self.lifecycle.len()
    }

    /// Triggers whose geometry has not arrived yet.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Running totals.
    pub fn stats(&self) -> ShowStats {
        self.stats
    }

    /// The viewport and its shared resolution.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Model the next trigger will spawn.
    pub fn next_model(&self) -> &str {
        self.scheduler.cursor().current()
    }
}

impl<S, R> std::fmt::Debug for FireworkShow<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FireworkShow")
            .field("viewport", &self.viewport)
            .field("active", &self.lifecycle.len())
            .field("pending", &self.pending.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::effect::testing::RecordingBackend;
    use crate::effect::LifecycleState;
    use crate::loader::InMemorySource;

    const MODELS: [&str; 4] = ["A", "B", "C", "D"];

    fn options() -> Options {
        let mut options = Options::default();
        options.show.models = MODELS.iter().map(|m| (*m).to_owned()).collect();
        options.show.seed = Some(7);
        options.effect.particle_count = 32;
        options
    }

    fn source() -> InMemorySource {
        MODELS.iter().enumerate().fold(
            InMemorySource::new(),
            |source, (i, model)| {
                source.with_model(*model, vec![Vec3::splat(i as f32); i + 1])
            },
        )
    }

    fn show_with(
        options: &Options,
        source: InMemorySource,
    ) -> FireworkShow<InMemorySource, crate::effect::testing::RecordedEffect>
    {
        let viewport = Viewport::new(320, 240, 1.0, 2.0);
        FireworkShow::new(options, viewport, source).unwrap()
    }

    #[test]
    fn spawns_follow_the_model_cycle() {
        let mut show = show_with(&options(), source());
        let mut backend = RecordingBackend::default();
        let now = Instant::now();

        let order: Vec<String> =
            (0..5).map(|_| show.trigger().model).collect();
        assert_eq!(order, ["A", "B", "C", "D", "A"]);

        let report = show.tick(&mut backend, now);
        assert_eq!(report.spawned.len(), 5);
        let drawn: Vec<&str> =
            show.drawable().map(|(inst, _)| inst.model()).collect();
        assert_eq!(drawn, ["A", "B", "C", "D", "A"]);
        assert_eq!(show.pending_count(), 0);
    }

    #[test]
    fn nothing_exists_until_geometry_arrives() {
        let mut show = show_with(&options(), source());
        let _ = show.trigger();
        assert_eq!(show.active_count(), 0);
        assert_eq!(show.pending_count(), 1);
    }

    #[test]
    fn empty_geometry_registers_nothing() {
        let src = source().with_model("E", Vec::new());
        let mut opts = options();
        opts.show.models = vec!["E".into(), "A".into()];
        let mut show = show_with(&opts, src);
        let mut backend = RecordingBackend::default();

        let _ = show.trigger();
        let report = show.tick(&mut backend, Instant::now());

        assert!(report.spawned.is_empty());
        assert!(matches!(
            report.failed[0].1,
            FireworksError::EmptyGeometry { .. }
        ));
        assert_eq!(show.active_count(), 0);
        assert_eq!(backend.live_count(), 0);
        assert_eq!(show.stats().failed, 1);
        assert_eq!(show.next_model(), "A");
    }

    #[test]
    fn load_failure_still_advances_the_cursor() {
        let mut opts = options();
        opts.show.models = vec!["missing".into(), "B".into()];
        let mut show = show_with(&opts, source());
        let mut backend = RecordingBackend::default();
        let now = Instant::now();

        let _ = show.trigger();
        let _ = show.trigger();
        let report = show.tick(&mut backend, now);

        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0].1,
            FireworksError::LoadFailure { .. }
        ));
        assert_eq!(report.spawned.len(), 1);
        assert_eq!(show.instance(report.spawned[0]).unwrap().model(), "B");
    }

    #[test]
    fn resize_reaches_old_and_new_instances() {
        let mut show = show_with(&options(), source());
        let mut backend = RecordingBackend::default();
        let now = Instant::now();

        let _ = show.trigger();
        let before = show.tick(&mut backend, now).spawned[0];

        assert_eq!(show.resize(800, 600, 2.0), Vec2::new(1600.0, 1200.0));

        let _ = show.trigger();
        let after = show
            .tick(&mut backend, now + Duration::from_millis(10))
            .spawned[0];

        for id in [before, after] {
            let params = show.instance(id).unwrap().params();
            assert_eq!(params.resolution.get(), Vec2::new(1600.0, 1200.0));
        }
    }

    #[test]
    fn progress_is_elapsed_over_duration() {
        let mut show = show_with(&options(), source());
        let mut backend = RecordingBackend::default();
        let start = Instant::now();

        let _ = show.trigger();
        let id = show.tick(&mut backend, start).spawned[0];
        let _ = show.tick(&mut backend, start + Duration::from_millis(750));
        let quarter = show.instance(id).unwrap().progress();
        let _ = show.tick(&mut backend, start + Duration::from_millis(1500));
        let half = show.instance(id).unwrap().progress();

        assert!((quarter - 0.25).abs() < 1e-3, "progress {quarter}");
        assert!((half - 0.5).abs() < 1e-3, "progress {half}");
    }

    #[test]
    fn drawn_resolution_tracks_the_viewport() {
        let mut show = show_with(&options(), source());
        let mut backend = RecordingBackend::default();
        assert!(show.drawn_resolution().is_none());

        let _ = show.trigger();
        let _ = show.tick(&mut backend, Instant::now());
        let _ = show.resize(640, 480, 2.0);

        let handle = show.drawn_resolution().unwrap();
        assert_eq!(handle.get(), Vec2::new(1280.0, 960.0));
        assert!(handle.shares_with(&show.viewport().resolution_handle()));
    }

    #[test]
    fn completed_instances_are_released_once() {
        let mut show = show_with(&options(), source());
        let mut backend = RecordingBackend::default();
        let start = Instant::now();

        let _ = show.trigger();
        let id = show.tick(&mut backend, start).spawned[0];
        assert_eq!(show.instance(id).unwrap().state(), LifecycleState::Animating);

        let _ = show.tick(&mut backend, start + Duration::from_millis(1500));
        assert_eq!(show.active_count(), 1);

        let report = show.tick(&mut backend, start + Duration::from_secs(3));
        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.completed[0].id, id);
        assert_eq!(report.completed[0].state, LifecycleState::Completed);
        assert!(show.instance(id).is_none());
        assert_eq!(show.drawable().count(), 0);
        assert_eq!(backend.live_count(), 0);
        assert_eq!(backend.released.len(), 1);

        let report = show.tick(&mut backend, start + Duration::from_secs(5));
        assert!(report.completed.is_empty());
        assert_eq!(
            show.stats(),
            ShowStats {
                spawned: 1,
                completed: 1,
                failed: 0,
                active: 0,
            }
        );
    }

    #[test]
    fn cap_drops_spawns_without_allocating() {
        let mut opts = options();
        opts.show.max_active = Some(1);
        let mut show = show_with(&opts, source());
        let mut backend = RecordingBackend::default();

        let _ = show.trigger();
        let _ = show.trigger();
        let report = show.tick(&mut backend, Instant::now());

        assert_eq!(report.spawned.len(), 1);
        assert!(matches!(report.failed[0].1, FireworksError::SpawnLimit(1)));
        assert_eq!(backend.live_count(), 1);
        assert_eq!(show.next_model(), "C");
    }

    #[test]
    fn invalid_options_fail_before_any_state() {
        let mut opts = options();
        opts.effect.duration_secs = -1.0;
        let viewport = Viewport::new(320, 240, 1.0, 2.0);
        let result: Result<FireworkShow<_, ()>, _> =
            FireworkShow::new(&opts, viewport, source());
        assert!(matches!(result, Err(FireworksError::InvalidDuration(_))));
    }

    #[test]
    fn sampled_positions_come_from_the_model() {
        let mut show = show_with(&options(), source());
        let mut backend = RecordingBackend::default();

        let _ = show.trigger();
        let _ = show.trigger();
        let _ = show.tick(&mut backend, Instant::now());

        for (instance, _) in show.drawable() {
            let attrs = instance.attributes();
            let vertex_count = if instance.model() == "A" { 1 } else { 2 };
            assert_eq!(attrs.len(), 32);
            assert!(attrs
                .source_indices
                .iter()
                .all(|&i| (i as usize) < vertex_count));
        }
    }
}
