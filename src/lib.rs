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

//! Host-independent 3D camera and scene interaction.
//!
//! Viewkit turns mouse gestures into camera and object transforms
//! without touching a renderer or a windowing toolkit. The host feeds
//! pointer events in and reads matrices out.
//!
//! # Key entry points
//!
//! - [`frame::FrameArena`] - the coordinate-frame hierarchy, addressed
//!   by stable [`frame::FrameId`] handles
//! - [`camera::Camera`] - projection, adaptive clipping, fitting,
//!   project/unproject
//! - [`input::InteractionController`] - the gesture state machine
//! - [`interpolator::KeyFrameInterpolator`] - keyframed camera/object
//!   paths
//! - [`options::Options`] - serializable tuning and bindings
//!
//! # Architecture
//!
//! All frames (including each camera's) live in one [`frame::FrameArena`];
//! world poses are derived by walking reference chains, never cached.
//! Everything periodic runs through the host-pluggable
//! [`timer::TimerService`], so the crate itself never sleeps, spawns, or
//! polls a clock. A typical tick: feed events, fire due timers, then one
//! matrix-derivation pass before rendering.

pub mod camera;
pub mod error;
pub mod frame;
pub mod input;
pub mod interpolator;
pub mod math;
pub mod options;
pub mod timer;
