//! The particle-effect lifecycle engine.
//!
//! Data flows leaves-first: [`sampler`] turns a vertex buffer into particle
//! attributes, [`assembler`] wraps them in a [`ParticleInstance`] with
//! shader parameters and GPU resources, [`lifecycle`] animates and retires
//! instances, and [`scheduler`] decides which model the next trigger spawns.

pub mod assembler;
pub mod backend;
pub mod color;
pub mod instance;
pub mod lifecycle;
pub mod sampler;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use assembler::{AssembledEffect, EffectAssembler, TextureSelection};
pub use backend::EffectBackend;
pub use color::FireworkColor;
pub use instance::{
    InstanceId, LifecycleState, ParticleInstance, Placement, ShaderParams,
    TextureIndex,
};
pub use lifecycle::{CompletedEffect, LifecycleManager};
pub use sampler::{ParticleAttributes, SpreadMode, VertexSampler};
pub use scheduler::{ModelCursor, SpawnScheduler, SpawnTicket};
