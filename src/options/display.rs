use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Window and frame settings.
pub struct DisplayOptions {
    /// Window title.
    pub title: String,
    /// Initial logical window size.
    pub window_size: [u32; 2],
    /// Background color (linear RGB).
    pub clear_color: [f32; 3],
    /// Frame rate limit. Zero disables the limiter.
    pub target_fps: u32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            title: "Fireworks".into(),
            window_size: [1280, 720],
            clear_color: [0.0, 0.0, 0.0],
            target_fps: 0,
        }
    }
}
