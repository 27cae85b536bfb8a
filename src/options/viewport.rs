use serde::{Deserialize, Serialize};

use crate::error::FireworksError;
use crate::viewport::DEFAULT_MAX_PIXEL_RATIO;

/// Pixel-ratio handling for the shared resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportOptions {
    /// Upper bound applied to the reported device pixel ratio, in
    /// `(0, 2]`.
    pub max_pixel_ratio: f32,
}

impl ViewportOptions {
    pub(super) fn validate(&self) -> Result<(), FireworksError> {
        if self.max_pixel_ratio > 0.0
            && self.max_pixel_ratio <= DEFAULT_MAX_PIXEL_RATIO
        {
            Ok(())
        } else {
            Err(FireworksError::InvalidOptions(format!(
                "viewport.max_pixel_ratio must be in (0, {DEFAULT_MAX_PIXEL_RATIO}], got {}",
                self.max_pixel_ratio
            )))
        }
    }
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
        }
    }
}
