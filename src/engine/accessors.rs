//! Read-only queries on [`FireworksEngine`].

use glam::Vec2;

use super::{EngineShow, FireworksEngine};
use crate::options::Options;
use crate::show::ShowStats;

impl FireworksEngine {
    /// Smoothed frames per second.
    pub fn fps(&self) -> f32 {
        self.frame_timing.fps()
    }

    /// Show totals.
    pub fn stats(&self) -> ShowStats {
        self.show.stats()
    }

    /// The running show.
    pub fn show(&self) -> &EngineShow {
        &self.show
    }

    /// Options the engine was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Shared device-pixel resolution.
    pub fn resolution(&self) -> Vec2 {
        self.show.viewport().resolution()
    }

    /// Physical surface size.
    pub fn screen_size(&self) -> (u32, u32) {
        self.context.size()
    }

    /// Effects currently holding GPU buffers.
    pub fn gpu_effect_count(&self) -> usize {
        self.backend.live_count()
    }

    /// When the frame limiter will next allow a frame, if limited.
    pub fn next_frame_at(&self) -> Option<web_time::Instant> {
        self.frame_timing.next_frame_at()
    }
}
