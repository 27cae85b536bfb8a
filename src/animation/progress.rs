//! Time-driven progress for a single effect instance.

use std::time::Duration;

use web_time::Instant;

use crate::error::FireworksError;

/// Outcome of advancing a [`ProgressAnimator`] to a new instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationTick {
    /// Still animating; carries the current progress in `[0, 1)`.
    Running(f32),
    /// Progress reached 1 on this update. Reported exactly once.
    Completed,
    /// Already completed on an earlier update; nothing was written.
    Finished,
}

/// Convert a duration in seconds into a [`Duration`], rejecting zero,
/// negative, and non-finite values.
///
/// # Errors
///
/// Returns [`FireworksError::InvalidDuration`] for any non-positive or
/// non-representable value.
pub fn checked_duration(secs: f32) -> Result<Duration, FireworksError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(FireworksError::InvalidDuration(secs));
    }
    match Duration::try_from_secs_f32(secs) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(FireworksError::InvalidDuration(secs)),
    }
}

/// Drives one instance's progress from 0 to 1 over a fixed wall-clock
/// duration, independent of frame rate.
///
/// Progress is `clamp(elapsed / duration, 0, 1)` with no easing. It never
/// decreases, and once it reaches 1 the animator reports completion a
/// single time and ignores further updates.
pub struct ProgressAnimator {
    /// When the animation started.
    start_time: Instant,
    /// Total duration.
    duration: Duration,
    /// Last progress value written.
    progress: f32,
    /// Set once completion has been reported.
    finished: bool,
}

impl ProgressAnimator {
    /// Start a new animation at `start_time`.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidDuration`] if `duration_secs` is not
    /// a positive finite number. Such an animator never reaches the running
    /// state.
    pub fn new(
        duration_secs: f32,
        start_time: Instant,
    ) -> Result<Self, FireworksError> {
        let duration = checked_duration(duration_secs)?;
        Ok(Self::from_checked(duration, start_time))
    }

    /// Start an animation with a duration already passed through
    /// [`checked_duration`].
    pub(crate) fn from_checked(duration: Duration, start_time: Instant) -> Self {
        debug_assert!(!duration.is_zero());
        Self {
            start_time,
            duration,
            progress: 0.0,
            finished: false,
        }
    }

    /// Total animation duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Last progress value written by [`update`](Self::update).
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether completion has already been reported.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Progress for a given elapsed time, without mutating state.
    pub fn progress_at(&self, elapsed: Duration) -> f32 {
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Advance to `now`.
    ///
    /// Instants earlier than the start time count as zero elapsed time.
    pub fn update(&mut self, now: Instant) -> AnimationTick {
        if self.finished {
            return AnimationTick::Finished;
        }

        let elapsed = now.saturating_duration_since(self.start_time);
        if elapsed >= self.duration {
            self.progress = 1.0;
            self.finished = true;
            return AnimationTick::Completed;
        }

        self.progress = self.progress.max(self.progress_at(elapsed));
        AnimationTick::Running(self.progress)
    }
}

impl std::fmt::Debug for ProgressAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressAnimator")
            .field("duration", &self.duration)
            .field("progress", &self.progress)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
