use web_time::{Duration, Instant};

/// Frame timing with FPS calculation and optional frame limiting
#[derive(Debug)]
pub struct FrameTiming {
    /// Target FPS (0 = unlimited)
    target_fps: u32,
    /// Minimum frame duration based on target FPS
    min_frame_duration: Duration,
    /// Last frame timestamp
    last_frame: Instant,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl FrameTiming {
    /// Create a new frame timer with the given FPS target (0 = unlimited).
    pub fn new(target_fps: u32) -> Self {
        Self::starting_at(target_fps, Instant::now())
    }

    fn starting_at(target_fps: u32, now: Instant) -> Self {
        let min_frame_duration = if target_fps > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        } else {
            Duration::ZERO
        };

        Self {
            target_fps,
            min_frame_duration,
            last_frame: now,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Whether enough time has passed since the last frame to render.
    pub fn should_render(&self) -> bool {
        self.should_render_at(Instant::now())
    }

    fn should_render_at(&self, now: Instant) -> bool {
        self.target_fps == 0
            || now.saturating_duration_since(self.last_frame)
                >= self.min_frame_duration
    }

    /// Call after rendering. Returns the frame time in seconds.
    pub fn end_frame(&mut self) -> f32 {
        self.end_frame_at(Instant::now())
    }

    fn end_frame_at(&mut self, now: Instant) -> f32 {
        let frame_time =
            now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            // Exponential moving average for smooth display
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        frame_time
    }

    /// Get the current FPS (smoothed)
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// When the next frame is due, if a limit is set.
    pub fn next_frame_at(&self) -> Option<Instant> {
        (self.target_fps > 0).then(|| self.last_frame + self.min_frame_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_always_renders() {
        let start = Instant::now();
        let timing = FrameTiming::starting_at(0, start);
        assert!(timing.should_render_at(start));
        assert!(timing.next_frame_at().is_none());
    }

    #[test]
    fn limit_waits_for_the_frame_budget() {
        let start = Instant::now();
        let timing = FrameTiming::starting_at(50, start);
        assert!(!timing.should_render_at(start + Duration::from_millis(5)));
        assert!(timing.should_render_at(start + Duration::from_millis(20)));
        assert_eq!(
            timing.next_frame_at(),
            Some(start + Duration::from_millis(20))
        );
    }

    #[test]
    fn fps_moves_toward_the_frame_rate() {
        let start = Instant::now();
        let mut timing = FrameTiming::starting_at(0, start);
        let mut now = start;
        for _ in 0..200 {
            now += Duration::from_millis(10);
            let dt = timing.end_frame_at(now);
            assert!((dt - 0.01).abs() < 1e-4);
        }
        assert!((timing.fps() - 100.0).abs() < 1.0);
    }
}
