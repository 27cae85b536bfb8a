// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! GPU particle fireworks sampled from 3D model geometry, built on wgpu.
//!
//! Each firework takes the vertex positions of a glTF model, scatters a
//! fixed number of particles over them, and animates those particles
//! through an explode / fall / twinkle sequence before they fade out.
//! Models are used in a fixed round-robin order, one per trigger.
//!
//! # Key entry points
//!
//! - [`show::FireworkShow`] - spawn, tick, and retire effects; independent
//!   of any GPU or window
//! - [`engine::FireworksEngine`] - renders a show into a wgpu surface
//! - [`options::Options`] - runtime configuration (show, effect, camera,
//!   display), loadable from TOML presets
//! - [`Viewer`] - a standalone winit window (`viewer` feature)
//!
//! # Architecture
//!
//! Geometry is decoded on a background [`loader::ThreadedLoader`] thread and
//! delivered back through a channel. When it arrives the show samples
//! particle attributes, assembles an instance with a fresh color, sprite,
//! and size, and registers it with the lifecycle manager. Every frame the
//! manager advances each instance's progress and hands finished ones back
//! to the [`effect::EffectBackend`] for release. The GPU backend keeps one
//! instance-rate vertex buffer and one uniform per live effect; the
//! particle pass draws them all additively in a single render pass.

pub mod animation;
pub mod camera;
pub mod effect;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod loader;
pub mod options;
pub mod show;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;
pub mod viewport;

pub use engine::FireworksEngine;
pub use error::FireworksError;
pub use input::event::{InputEvent, MouseButton};
pub use options::Options;
pub use show::FireworkShow;
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
