//! The particle render pass: pipeline, frame uniform, and draw loop.

use image::RgbaImage;

use super::backend::{effect_layout, GpuEffect, ParticleVertex, WgpuBackend};
use super::texture::{sprite_layout, SpriteTextures};
use crate::camera::core::Camera;
use crate::effect::ParticleInstance;
use crate::viewport::ResolutionHandle;

/// Vertices per particle quad (two triangles).
pub const VERTICES_PER_PARTICLE: u32 = 6;

/// Frame-wide uniform (group 0).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    /// World-to-view matrix.
    pub view: [[f32; 4]; 4],
    /// View-to-clip matrix.
    pub proj: [[f32; 4]; 4],
    /// Shared device-pixel resolution.
    pub resolution: [f32; 2],
    pub(crate) _pad: [f32; 2],
}

const RESOLUTION_OFFSET: wgpu::BufferAddress =
    std::mem::offset_of!(FrameUniform, resolution) as wgpu::BufferAddress;

/// Draws every live firework with additive blending and no depth test.
pub struct ParticlePass {
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    effect_layout: wgpu::BindGroupLayout,
    sprites: SpriteTextures,
    resolution_revision: Option<u64>,
}

impl ParticlePass {
    /// Build the pipeline for `format` and upload the sprite set.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        sprite_images: &[RgbaImage],
    ) -> Self {
        let frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let effect_layout = effect_layout(device);
        let sprite_layout = sprite_layout(device);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform"),
            size: size_of::<FrameUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Frame Bind Group"),
                layout: &frame_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                }],
            });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Firework Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../assets/shaders/firework.wgsl").into(),
            ),
        });

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Firework Pipeline Layout"),
                bind_group_layouts: &[
                    &frame_layout,
                    &effect_layout,
                    &sprite_layout,
                ],
                push_constant_ranges: &[],
            });

        // Additive: overlapping particles brighten instead of occluding.
        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Firework Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[ParticleVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(additive),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        let sprites =
            SpriteTextures::new(device, queue, &sprite_layout, sprite_images);
        log::debug!("particle pass ready with {} sprites", sprites.len());

        Self {
            pipeline,
            frame_buffer,
            frame_bind_group,
            effect_layout,
            sprites,
            resolution_revision: None,
        }
    }

    /// A backend whose effect bind groups match this pipeline.
    pub fn backend(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> WgpuBackend {
        WgpuBackend::new(device.clone(), queue.clone(), self.effect_layout.clone())
    }

    /// Upload the camera matrices.
    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera) {
        let matrices = [
            camera.view_matrix().to_cols_array_2d(),
            camera.projection_matrix().to_cols_array_2d(),
        ];
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::cast_slice(&matrices),
        );
    }

    /// Upload the shared resolution if it changed since the last call.
    ///
    /// Returns whether a write was issued.
    pub fn update_resolution(
        &mut self,
        queue: &wgpu::Queue,
        resolution: &ResolutionHandle,
    ) -> bool {
        let revision = resolution.revision();
        if self.resolution_revision == Some(revision) {
            return false;
        }
        self.resolution_revision = Some(revision);
        queue.write_buffer(
            &self.frame_buffer,
            RESOLUTION_OFFSET,
            bytemuck::cast_slice(&resolution.get().to_array()),
        );
        true
    }

    /// Record draws for `effects` into an open render pass.
    pub fn draw<'a>(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        effects: impl Iterator<Item = (&'a ParticleInstance, &'a GpuEffect)>,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (instance, gpu) in effects {
            let Some(sprite) = self.sprites.bind_group(instance.params().texture)
            else {
                log::error!(
                    "{} references sprite {} of {}",
                    instance.id(),
                    instance.params().texture.0,
                    self.sprites.len()
                );
                continue;
            };
            pass.set_bind_group(1, gpu.bind_group(), &[]);
            pass.set_bind_group(2, sprite, &[]);
            pass.set_vertex_buffer(0, gpu.particles().slice(..));
            pass.draw(0..VERTICES_PER_PARTICLE, 0..gpu.particle_count());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_uniform_matches_the_shader_layout() {
        assert_eq!(size_of::<FrameUniform>(), 144);
        assert_eq!(RESOLUTION_OFFSET, 128);
    }
}
