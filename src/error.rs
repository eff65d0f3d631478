//! Crate-level error types.

use std::fmt;

use crate::frame::FrameId;

/// Errors produced by the viewkit crate.
///
/// Only *structural* invariant violations surface here — the mutation
/// that would have introduced them is rejected and state is left
/// unchanged. Degenerate geometry (zero-length axes, near-parallel
/// slerp inputs, singular unprojection matrices) is recovered locally
/// with a safe fallback and never becomes an error.
#[derive(Debug)]
pub enum ViewError {
    /// Re-parenting a frame would create a reference cycle.
    CyclicReference(FrameId),
    /// The frame id is not (or no longer) present in the arena.
    UnknownFrame(FrameId),
    /// A keyframe's time precedes the last keyframe's time.
    NonMonotoneKeyFrame {
        /// The rejected keyframe time.
        time: f32,
        /// The current last keyframe time.
        last: f32,
    },
    /// Scene radius must be strictly positive.
    InvalidSceneRadius(f32),
    /// TOML/JSON options parsing or serialization failure.
    OptionsParse(String),
    /// The operation needs a capability the core does not own
    /// (e.g. depth-buffer read-back) and must be provided by the host.
    Unsupported(&'static str),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CyclicReference(id) => {
                write!(f, "frame {id:?} would become its own ancestor")
            }
            Self::UnknownFrame(id) => write!(f, "unknown frame {id:?}"),
            Self::NonMonotoneKeyFrame { time, last } => write!(
                f,
                "keyframe time {time} precedes the last keyframe time {last}"
            ),
            Self::InvalidSceneRadius(r) => {
                write!(f, "scene radius must be > 0, got {r}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Unsupported(what) => {
                write!(f, "not supported here: {what}")
            }
        }
    }
}

impl std::error::Error for ViewError {}
