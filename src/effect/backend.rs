//! Seam between the lifecycle engine and whatever owns GPU memory.

use super::instance::ParticleInstance;

/// Allocates, updates, and releases the GPU-resident side of an instance.
///
/// `release` takes the resources by value, so a handle cannot be released
/// twice and cannot be used after release.
pub trait EffectBackend {
    /// GPU-side handles for one instance (attribute buffers, uniforms, bind
    /// groups).
    type Resources;

    /// Upload the instance's attributes and parameters.
    fn allocate(&mut self, instance: &ParticleInstance) -> Self::Resources;

    /// Push the instance's current shader parameters (progress) to the GPU.
    fn write_params(
        &mut self,
        instance: &ParticleInstance,
        resources: &mut Self::Resources,
    );

    /// Free everything acquired by [`allocate`](Self::allocate).
    fn release(&mut self, resources: Self::Resources);
}
