//! Input handling: platform-agnostic event types and the click/drag
//! state machine that turns a short click into a spawn trigger.

/// Platform-agnostic input events.
pub mod event;
/// Press/release tracking that tells clicks from drags.
pub(crate) mod mouse;

pub use event::{InputEvent, MouseButton};
