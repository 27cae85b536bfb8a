//! The windowed firework engine: owns the GPU context, the particle pass,
//! the camera, and the [`FireworkShow`], and turns input plus frame ticks
//! into rendered frames.

mod accessors;
mod input;

use std::path::{Path, PathBuf};

use web_time::Instant;

use crate::camera::{Camera, OrbitController};
use crate::error::FireworksError;
use crate::gpu::texture::load_sprite_images;
use crate::gpu::{GpuEffect, ParticlePass, RenderContext, WgpuBackend};
use crate::input::mouse::ClickTracker;
use crate::loader::ThreadedLoader;
use crate::options::Options;
use crate::show::FireworkShow;
use crate::util::frame_timing::FrameTiming;
use crate::viewport::Viewport;

/// Show type driven by the engine.
pub type EngineShow = FireworkShow<ThreadedLoader, GpuEffect>;

/// Renders a firework show into a window surface.
pub struct FireworksEngine {
    context: RenderContext,
    pass: ParticlePass,
    backend: WgpuBackend,
    show: EngineShow,
    camera: Camera,
    orbit: OrbitController,
    clicks: ClickTracker,
    frame_timing: FrameTiming,
    scale_factor: f64,
    options: Options,
}

impl FireworksEngine {
    /// Build the engine for a window.
    ///
    /// `physical_size` is the surface size in device pixels and
    /// `scale_factor` the window's device pixel ratio. Model and sprite
    /// paths in `options` are resolved against `asset_root`.
    ///
    /// # Errors
    ///
    /// Fails on invalid options, GPU initialization failure, or if the
    /// loader thread cannot start.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        physical_size: (u32, u32),
        scale_factor: f64,
        options: Options,
        asset_root: &Path,
    ) -> Result<Self, FireworksError> {
        options.validate()?;

        let context = RenderContext::new(window, physical_size).await?;
        let (width, height) = context.size();

        let sprites = load_sprite_images(asset_root, &options.show.textures);
        let pass = ParticlePass::new(
            &context.device,
            &context.queue,
            context.format(),
            &sprites,
        );
        let backend = pass.backend(&context.device, &context.queue);

        let (logical_width, logical_height) =
            logical_size(width, height, scale_factor);
        let viewport = Viewport::new(
            logical_width,
            logical_height,
            scale_factor as f32,
            options.viewport.max_pixel_ratio,
        );

        let loader = ThreadedLoader::new(PathBuf::from(asset_root))?;
        let show = FireworkShow::new(&options, viewport, loader)?;

        let camera = Camera::from_options(
            &options.camera,
            width as f32 / height.max(1) as f32,
        );
        let orbit = OrbitController::new(&options.camera);

        Ok(Self {
            context,
            pass,
            backend,
            show,
            camera,
            orbit,
            clicks: ClickTracker::default(),
            frame_timing: FrameTiming::new(options.display.target_fps),
            scale_factor,
            options,
        })
    }

    /// Spawn the next firework in the model cycle.
    pub fn trigger(&mut self) {
        let _ = self.show.trigger();
    }

    /// Advance the show and draw one frame.
    ///
    /// Returns early without drawing when the frame limiter says it is too
    /// soon.
    ///
    /// # Errors
    ///
    /// Returns the surface error if no swapchain texture could be acquired.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.frame_timing.should_render() {
            return Ok(());
        }

        let _ = self.show.tick(&mut self.backend, Instant::now());

        self.orbit.update(&mut self.camera);
        self.pass.update_camera(&self.context.queue, &self.camera);
        if let Some(resolution) = self.show.drawn_resolution() {
            let _ = self
                .pass
                .update_resolution(&self.context.queue, resolution);
        }

        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.context.create_encoder();

        {
            let [r, g, b] = self.options.display.clear_color;
            let mut rp =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Firework Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &view,
                            depth_slice: None,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: f64::from(r),
                                    g: f64::from(g),
                                    b: f64::from(b),
                                    a: 1.0,
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                        },
                    )],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            self.pass.draw(&mut rp, self.show.drawable());
        }

        self.context.submit(encoder);
        frame.present();
        let _ = self.frame_timing.end_frame();
        Ok(())
    }

    /// Resize the surface to a new physical size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.camera.resize(width, height);

        let (logical_width, logical_height) =
            logical_size(width, height, self.scale_factor);
        let _ = self.show.resize(
            logical_width,
            logical_height,
            self.scale_factor as f32,
        );
    }

    /// Update the device pixel ratio. The surface size arrives separately
    /// through [`resize`](Self::resize).
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
        let (width, height) = self.context.size();
        self.resize(width, height);
    }

    /// Reconfigure the surface after it was lost or outdated.
    pub fn recover_surface(&self) {
        self.context.reconfigure();
    }
}

/// Physical pixels to logical pixels, never below 1.
fn logical_size(width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
    let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    };
    let to_logical = |v: u32| ((f64::from(v) / scale).round() as u32).max(1);
    (to_logical(width), to_logical(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_size_divides_out_the_scale() {
        assert_eq!(logical_size(1600, 1200, 2.0), (800, 600));
        assert_eq!(logical_size(1000, 500, 1.0), (1000, 500));
        assert_eq!(logical_size(640, 480, 0.0), (640, 480));
        assert_eq!(logical_size(1, 1, 4.0), (1, 1));
    }
}
