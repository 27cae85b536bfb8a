//! Viewport size tracking and the shared device-pixel resolution.
//!
//! One [`SharedResolution`] value exists per show. [`Viewport`] is its only
//! writer; every effect instance holds a [`ResolutionHandle`] that reads the
//! same cell. A resize therefore becomes visible to all live instances at
//! once, with no per-instance update loop.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

/// Default cap on the device pixel ratio.
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

#[derive(Debug, Default)]
struct ResolutionCell {
    value: Cell<Vec2>,
    revision: Cell<u64>,
}

/// The writable side of the shared resolution. Not `Clone`: there is exactly
/// one writer.
#[derive(Debug)]
pub struct SharedResolution {
    cell: Rc<ResolutionCell>,
}

impl SharedResolution {
    fn new(value: Vec2) -> Self {
        let cell = Rc::new(ResolutionCell::default());
        cell.value.set(value);
        Self { cell }
    }

    /// Overwrite the value in place. All handles observe the new value.
    fn set(&self, value: Vec2) {
        self.cell.value.set(value);
        self.cell.revision.set(self.cell.revision.get() + 1);
    }

    /// A new read-only handle onto this value.
    pub fn handle(&self) -> ResolutionHandle {
        ResolutionHandle {
            cell: Rc::clone(&self.cell),
        }
    }

    /// Current value.
    pub fn get(&self) -> Vec2 {
        self.cell.value.get()
    }
}

/// Read-only reference to the shared resolution.
#[derive(Debug, Clone)]
pub struct ResolutionHandle {
    cell: Rc<ResolutionCell>,
}

impl ResolutionHandle {
    /// Current resolution in device pixels.
    pub fn get(&self) -> Vec2 {
        self.cell.value.get()
    }

    /// Counter bumped on every write. Lets GPU-side consumers upload only
    /// when the value changed.
    pub fn revision(&self) -> u64 {
        self.cell.revision.get()
    }

    /// Whether two handles point at the same shared value.
    pub fn shares_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

/// Tracks the logical window size and capped pixel ratio and keeps the
/// shared resolution equal to `(width × ratio, height × ratio)`.
#[derive(Debug)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_ratio: f32,
    max_pixel_ratio: f32,
    resolution: SharedResolution,
}

impl Viewport {
    /// Viewport for the given logical size and reported device pixel ratio.
    pub fn new(
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
        max_pixel_ratio: f32,
    ) -> Self {
        let pixel_ratio = cap_pixel_ratio(device_pixel_ratio, max_pixel_ratio);
        let resolution =
            SharedResolution::new(scaled(width, height, pixel_ratio));
        Self {
            width,
            height,
            pixel_ratio,
            max_pixel_ratio,
            resolution,
        }
    }

    /// Handle handed to each new effect instance.
    pub fn resolution_handle(&self) -> ResolutionHandle {
        self.resolution.handle()
    }

    /// Apply a resize or pixel-density change and return the new resolution.
    ///
    /// The pixel ratio is capped before use, and the shared value is mutated
    /// in place rather than replaced.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
    ) -> Vec2 {
        self.width = width;
        self.height = height;
        self.pixel_ratio =
            cap_pixel_ratio(device_pixel_ratio, self.max_pixel_ratio);

        let value = scaled(width, height, self.pixel_ratio);
        self.resolution.set(value);
        log::debug!(
            "viewport {width}x{height} @ {:.2} -> resolution {}x{}",
            self.pixel_ratio,
            value.x,
            value.y
        );
        value
    }

    /// Current shared resolution.
    pub fn resolution(&self) -> Vec2 {
        self.resolution.get()
    }

    /// Logical width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel ratio after capping.
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Width / height, guarding against a zero height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// `max` may lower the cap but never raise it past
/// [`DEFAULT_MAX_PIXEL_RATIO`].
fn cap_pixel_ratio(reported: f32, max: f32) -> f32 {
    if reported.is_finite() && reported > 0.0 {
        reported.min(max.min(DEFAULT_MAX_PIXEL_RATIO))
    } else {
        1.0
    }
}

fn scaled(width: u32, height: u32, pixel_ratio: f32) -> Vec2 {
    Vec2::new(width as f32 * pixel_ratio, height as f32 * pixel_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_scales_by_pixel_ratio() {
        let mut viewport = Viewport::new(100, 100, 1.0, 2.0);
        let value = viewport.resize(800, 600, 2.0);
        assert_eq!(value, Vec2::new(1600.0, 1200.0));
        assert_eq!(viewport.resolution(), Vec2::new(1600.0, 1200.0));
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let viewport = Viewport::new(800, 600, 3.0, DEFAULT_MAX_PIXEL_RATIO);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.resolution(), Vec2::new(1600.0, 1200.0));
    }

    #[test]
    fn configured_cap_cannot_exceed_two() {
        let mut viewport = Viewport::new(800, 600, 3.0, 4.0);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.resize(400, 300, 3.5), Vec2::new(800.0, 600.0));

        let lowered = Viewport::new(800, 600, 3.0, 1.5);
        assert_eq!(lowered.pixel_ratio(), 1.5);
    }

    #[test]
    fn bogus_pixel_ratio_falls_back_to_one() {
        let viewport = Viewport::new(640, 480, f32::NAN, 2.0);
        assert_eq!(viewport.resolution(), Vec2::new(640.0, 480.0));
    }

    #[test]
    fn handles_see_writes_made_after_they_were_taken() {
        let mut viewport = Viewport::new(320, 240, 1.0, 2.0);
        let early = viewport.resolution_handle();
        let _ = viewport.resize(800, 600, 2.0);
        let late = viewport.resolution_handle();

        assert_eq!(early.get(), Vec2::new(1600.0, 1200.0));
        assert_eq!(late.get(), early.get());
        assert!(early.shares_with(&late));
    }

    #[test]
    fn revision_bumps_per_write() {
        let mut viewport = Viewport::new(320, 240, 1.0, 2.0);
        let handle = viewport.resolution_handle();
        let before = handle.revision();
        let _ = viewport.resize(320, 240, 1.0);
        let _ = viewport.resize(640, 480, 1.0);
        assert_eq!(handle.revision(), before + 2);
    }
}
