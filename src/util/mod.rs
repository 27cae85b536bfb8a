//! Small helpers shared by the viewer and engine.

/// Frame pacing and smoothed FPS.
pub mod frame_timing;
