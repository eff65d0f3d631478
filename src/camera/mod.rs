//! Camera abstraction built on the frame hierarchy.
//!
//! Provides perspective/orthographic projection with adaptive
//! near/far clipping derived from the scene bounding sphere,
//! project/unproject, frustum extraction, and sphere/region fitting.

/// Core camera type: matrices, clipping, fitting.
pub mod core;
/// View frustum extraction and intersection tests.
pub mod frustum;

pub use self::core::{Camera, ProjectionKind, ScreenRegion};
pub use frustum::{Frustum, Plane};
