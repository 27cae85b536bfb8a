//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the fireworks crate.
#[derive(Debug)]
pub enum FireworksError {
    /// The source mesh exposed no vertex positions.
    EmptyGeometry {
        /// Model identifier the geometry was requested for.
        model: String,
    },
    /// Animation duration was zero, negative, or not finite.
    InvalidDuration(f32),
    /// The loader could not resolve or decode a model identifier.
    LoadFailure {
        /// Model identifier that failed.
        model: String,
        /// Loader-provided reason.
        reason: String,
    },
    /// The configured cap on simultaneously active effects was reached.
    SpawnLimit(usize),
    /// Options failed validation.
    InvalidOptions(String),
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl FireworksError {
    /// Whether the error only aborts a single spawn attempt.
    ///
    /// Spawn-local errors are logged and dropped by the show; everything
    /// else is surfaced to the caller.
    pub fn is_spawn_local(&self) -> bool {
        matches!(
            self,
            Self::EmptyGeometry { .. }
                | Self::LoadFailure { .. }
                | Self::SpawnLimit(_)
        )
    }
}

impl fmt::Display for FireworksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGeometry { model } => {
                write!(f, "model '{model}' has no vertex positions")
            }
            Self::InvalidDuration(secs) => {
                write!(f, "animation duration must be positive, got {secs}")
            }
            Self::LoadFailure { model, reason } => {
                write!(f, "failed to load model '{model}': {reason}")
            }
            Self::SpawnLimit(max) => {
                write!(f, "active effect limit of {max} reached")
            }
            Self::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for FireworksError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for FireworksError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for FireworksError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_local_errors() {
        let empty = FireworksError::EmptyGeometry {
            model: "papa.glb".into(),
        };
        let load = FireworksError::LoadFailure {
            model: "wish.glb".into(),
            reason: "not found".into(),
        };
        assert!(empty.is_spawn_local());
        assert!(load.is_spawn_local());
        assert!(FireworksError::SpawnLimit(4).is_spawn_local());
        assert!(!FireworksError::InvalidDuration(0.0).is_spawn_local());
    }

    #[test]
    fn display_names_the_model() {
        let err = FireworksError::LoadFailure {
            model: "day.glb".into(),
            reason: "bad magic".into(),
        };
        assert_eq!(err.to_string(), "failed to load model 'day.glb': bad magic");
    }
}
