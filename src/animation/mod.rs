//! Progress animation for firework instances.

pub mod progress;

pub use progress::{AnimationTick, ProgressAnimator};
