//! GPU side of the show: device ownership, per-effect buffers, sprites, and
//! the particle render pass.

/// wgpu implementation of the effect backend.
pub mod backend;
/// Particle pipeline and draw loop.
pub mod particle_pass;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Sprite texture loading and upload.
pub mod texture;

pub use backend::{GpuEffect, WgpuBackend};
pub use particle_pass::ParticlePass;
pub use render_context::{RenderContext, RenderContextError};
pub use texture::SpriteTextures;
