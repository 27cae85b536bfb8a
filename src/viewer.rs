//! Standalone firework window backed by winit.
//!
//! Click (without dragging) or press Space to launch the next firework;
//! drag to orbit and scroll to zoom.
//!
//! ```no_run
//! # use fireworks::Viewer;
//! Viewer::builder()
//!     .with_asset_root(".")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    engine::FireworksEngine, error::FireworksError, options::Options,
    InputEvent, MouseButton,
};

/// How often the viewer logs show statistics.
const STATS_INTERVAL: Duration = Duration::from_secs(5);

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    asset_root: PathBuf,
    title: Option<String>,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            asset_root: PathBuf::from("."),
            title: None,
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Directory that model and sprite paths are relative to.
    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Set the window title, overriding `display.title`.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        let options = self.options.unwrap_or_default();
        let title = self
            .title
            .unwrap_or_else(|| options.display.title.clone());
        Viewer {
            options,
            asset_root: self.asset_root,
            title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window running a firework show.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    asset_root: PathBuf,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidOptions`] (or another validation
    /// error) before opening a window if the options are unusable, and
    /// [`FireworksError::Viewer`] if the event loop fails.
    pub fn run(self) -> Result<(), FireworksError> {
        self.options.validate()?;

        let event_loop = EventLoop::new()
            .map_err(|e| FireworksError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            options: self.options,
            asset_root: self.asset_root,
            title: self.title,
            last_stats_log: Instant::now(),
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| FireworksError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<FireworksEngine>,
    options: Options,
    asset_root: PathBuf,
    title: String,
    last_stats_log: Instant,
}

impl ViewerApp {
    fn redraw(&mut self) {
        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };

        match engine.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                engine.recover_surface();
            }
            Err(e) => log::error!("render error: {e:?}"),
        }

        let now = Instant::now();
        if now.saturating_duration_since(self.last_stats_log) >= STATS_INTERVAL
        {
            let stats = engine.stats();
            log::info!(
                "{:.0} fps, {} active, {} spawned, {} completed, {} failed",
                engine.fps(),
                stats.active,
                stats.spawned,
                stats.completed,
                stats.failed
            );
            self.last_stats_log = now;
        }
        window.request_redraw();
    }

    fn forward(&mut self, event: InputEvent) {
        if let Some(engine) = &mut self.engine {
            if engine.handle_input(event) {
                log::debug!("firework triggered");
            }
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let [width, height] = self.options.display.window_size;
        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let inner = window.inner_size();
        let engine = pollster::block_on(FireworksEngine::new(
            Arc::clone(&window),
            (inner.width.max(1), inner.height.max(1)),
            window.scale_factor(),
            self.options.clone(),
            &self.asset_root,
        ));

        match engine {
            Ok(engine) => {
                window.request_redraw();
                self.window = Some(window);
                self.engine = Some(engine);
            }
            Err(e) => {
                log::error!("Failed to initialize engine: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.set_scale_factor(scale_factor);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::MouseInput { button, state, .. } => {
                self.forward(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.forward(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                self.forward(InputEvent::Scroll {
                    delta: scroll_delta,
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.physical_key == PhysicalKey::Code(KeyCode::Space)
                {
                    self.forward(InputEvent::Trigger);
                }
            }

            _ => (),
        }
    }
}
