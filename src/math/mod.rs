//! Math primitives for the interaction layer.
//!
//! Vectors and matrices come from [`glam`]; the bespoke
//! [`Quaternion`](quaternion::Quaternion) type exists because spline
//! interpolation needs `log`/`exp`/`squad` and flip-aware slerp,
//! which `glam::Quat` does not provide.

/// Unit-quaternion rotation type with spline support.
pub mod quaternion;

pub use quaternion::Quaternion;
