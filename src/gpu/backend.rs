//! wgpu implementation of [`EffectBackend`].
//!
//! Each effect owns one instance-rate vertex buffer holding its particle
//! attributes and one small uniform buffer with its shader parameters.
//! Both are created on allocation and destroyed on release.

use wgpu::util::DeviceExt;

use crate::effect::{EffectBackend, ParticleInstance};

/// Per-particle vertex data, stepped once per instance of the quad.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleVertex {
    /// Sampled position in model space.
    pub position: [f32; 3],
    /// Size multiplier in `[0, 1)`.
    pub size: f32,
    /// Animation-rate multiplier in `[1, 2)`.
    pub time_multiplier: f32,
}

impl ParticleVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32,
        2 => Float32,
    ];

    /// Vertex layout matching `ParticleIn` in the shader.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-effect uniform: placement, tint, size, and progress.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EffectUniform {
    /// Placement transform.
    pub model: [[f32; 4]; 4],
    /// Linear RGB tint.
    pub color: [f32; 3],
    /// Base point size.
    pub base_size: f32,
    /// Animation progress in `[0, 1]`.
    pub progress: f32,
    pub(crate) _pad: [f32; 3],
}

impl EffectUniform {
    /// Uniform contents for `instance`'s current parameters.
    pub fn from_instance(instance: &ParticleInstance) -> Self {
        let params = instance.params();
        Self {
            model: instance.placement().matrix().to_cols_array_2d(),
            color: params.color.to_linear_rgb(),
            base_size: params.base_size,
            progress: params.progress,
            _pad: [0.0; 3],
        }
    }
}

/// Interleave an instance's attribute arrays into vertex records.
pub fn particle_vertices(instance: &ParticleInstance) -> Vec<ParticleVertex> {
    let attrs = instance.attributes();
    attrs
        .positions
        .iter()
        .zip(&attrs.sizes)
        .zip(&attrs.time_multipliers)
        .map(|((position, &size), &time_multiplier)| ParticleVertex {
            position: position.to_array(),
            size,
            time_multiplier,
        })
        .collect()
}

/// Bind group layout for [`EffectUniform`] (group 1).
pub fn effect_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Effect Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX
                | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// GPU resources of one live effect.
#[derive(Debug)]
pub struct GpuEffect {
    particles: wgpu::Buffer,
    particle_count: u32,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuEffect {
    /// Instance-rate particle buffer.
    pub fn particles(&self) -> &wgpu::Buffer {
        &self.particles
    }

    /// Number of particles (quad instances) to draw.
    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    /// Bind group for the effect uniform.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Allocates, updates, and destroys per-effect GPU buffers.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: wgpu::BindGroupLayout,
    live: usize,
}

impl WgpuBackend {
    /// Backend creating bind groups against `layout` (see
    /// [`effect_layout`]).
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        layout: wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            device,
            queue,
            layout,
            live: 0,
        }
    }

    /// Effects currently holding GPU buffers.
    pub fn live_count(&self) -> usize {
        self.live
    }
}

impl EffectBackend for WgpuBackend {
    type Resources = GpuEffect;

    fn allocate(&mut self, instance: &ParticleInstance) -> GpuEffect {
        let vertices = particle_vertices(instance);
        let particles =
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Particles {}", instance.id())),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });

        let uniform =
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Effect Uniform {}", instance.id())),
                    contents: bytemuck::bytes_of(&EffectUniform::from_instance(
                        instance,
                    )),
                    usage: wgpu::BufferUsages::UNIFORM
                        | wgpu::BufferUsages::COPY_DST,
                });

        let bind_group =
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Effect {}", instance.id())),
                layout: &self.layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                }],
            });

        self.live += 1;
        GpuEffect {
            particles,
            particle_count: vertices.len() as u32,
            uniform,
            bind_group,
        }
    }

    fn write_params(
        &mut self,
        instance: &ParticleInstance,
        resources: &mut GpuEffect,
    ) {
        self.queue.write_buffer(
            &resources.uniform,
            0,
            bytemuck::bytes_of(&EffectUniform::from_instance(instance)),
        );
    }

    fn release(&mut self, resources: GpuEffect) {
        resources.particles.destroy();
        resources.uniform.destroy();
        self.live = self.live.saturating_sub(1);
    }
}
