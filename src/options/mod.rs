//! Centralized show options with TOML preset support.
//!
//! Every tunable (model list, sprite set, particle sampling, animation
//! timing, viewport cap, camera, window) lives here. Options serialize
//! to/from TOML so a show can be described by a preset file; bundled
//! presets live in `assets/presets/`.

mod camera;
mod display;
mod effect;
mod show;
mod viewport;

use std::path::Path;

pub use camera::CameraOptions;
pub use display::DisplayOptions;
pub use effect::EffectOptions;
use serde::{Deserialize, Serialize};
pub use show::ShowOptions;
pub use viewport::ViewportOptions;

use crate::error::FireworksError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[effect]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Model rotation, sprite set, and spawn limits.
    pub show: ShowOptions,
    /// Particle sampling and animation parameters.
    pub effect: EffectOptions,
    /// Pixel-ratio handling.
    pub viewport: ViewportOptions,
    /// Camera projection and orbit controls.
    pub camera: CameraOptions,
    /// Window and clear color.
    pub display: DisplayOptions,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::Io`] if the file cannot be read and
    /// [`FireworksError::OptionsParse`] if it is not valid TOML for this
    /// shape.
    pub fn load(path: &Path) -> Result<Self, FireworksError> {
        let content =
            std::fs::read_to_string(path).map_err(FireworksError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::OptionsParse`] on malformed input.
    pub fn from_toml(content: &str) -> Result<Self, FireworksError> {
        toml::from_str(content)
            .map_err(|e| FireworksError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::OptionsParse`] if serialization fails and
    /// [`FireworksError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), FireworksError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FireworksError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(FireworksError::Io)?;
        }
        std::fs::write(path, content).map_err(FireworksError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Reject values the show cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`FireworksError::InvalidOptions`] naming the first bad
    /// field, or [`FireworksError::InvalidDuration`] for a non-positive
    /// animation duration.
    pub fn validate(&self) -> Result<(), FireworksError> {
        self.show.validate()?;
        self.effect.validate()?;
        self.viewport.validate()
    }
}
