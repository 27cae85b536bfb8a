use serde::{Deserialize, Serialize};

use crate::error::FireworksError;

/// Which models to cycle through and which sprites to draw with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShowOptions {
    /// Model identifiers, spawned in this order and wrapping around.
    pub models: Vec<String>,
    /// Sprite image paths. Missing files fall back to a generated sprite.
    pub textures: Vec<String>,
    /// Cap on simultaneously active effects. Unlimited when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_active: Option<usize>,
    /// RNG seed for reproducible shows. Seeded from the OS when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ShowOptions {
    pub(super) fn validate(&self) -> Result<(), FireworksError> {
        if self.models.is_empty() {
            return Err(FireworksError::InvalidOptions(
                "show.models must name at least one model".into(),
            ));
        }
        if self.textures.is_empty() {
            return Err(FireworksError::InvalidOptions(
                "show.textures must list at least one sprite".into(),
            ));
        }
        if self.max_active == Some(0) {
            return Err(FireworksError::InvalidOptions(
                "show.max_active must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            models: ["papa", "wish", "good", "day"]
                .iter()
                .map(|name| format!("assets/models/{name}.glb"))
                .collect(),
            textures: (1..=8)
                .map(|i| format!("assets/particles/{i}.png"))
                .collect(),
            max_active: None,
            seed: None,
        }
    }
}
