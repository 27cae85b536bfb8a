//! In-memory backend for lifecycle tests.

use rustc_hash::FxHashSet;

use super::backend::EffectBackend;
use super::instance::ParticleInstance;

/// Handle standing in for GPU buffers.
#[derive(Debug)]
pub(crate) struct RecordedEffect {
    pub(crate) handle: u64,
    pub(crate) particles: usize,
    pub(crate) last_progress: f32,
}

/// Tracks live allocations so tests can check every handle is released
/// exactly once.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    next_handle: u64,
    live: FxHashSet<u64>,
    pub(crate) released: Vec<u64>,
    pub(crate) writes: usize,
}

impl RecordingBackend {
    pub(crate) fn live_count(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn is_live(&self, handle: u64) -> bool {
        self.live.contains(&handle)
    }
}

impl EffectBackend for RecordingBackend {
    type Resources = RecordedEffect;

    fn allocate(&mut self, instance: &ParticleInstance) -> RecordedEffect {
        let handle = self.next_handle;
        self.next_handle += 1;
        let _ = self.live.insert(handle);
        RecordedEffect {
            handle,
            particles: instance.particle_count(),
            last_progress: instance.progress(),
        }
    }

    fn write_params(
        &mut self,
        instance: &ParticleInstance,
        resources: &mut RecordedEffect,
    ) {
        assert!(self.live.contains(&resources.handle), "write after release");
        resources.last_progress = instance.progress();
        self.writes += 1;
    }

    fn release(&mut self, resources: RecordedEffect) {
        assert!(self.live.remove(&resources.handle), "double release");
        self.released.push(resources.handle);
    }
}
