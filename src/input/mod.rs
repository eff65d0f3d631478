//! Pointer input: events, bindings, grabbers, and the gesture state
//! machine.

/// Chord → action binding tables, runtime and serializable.
pub mod bindings;
/// The mouse-gesture state machine.
pub mod controller;
/// Platform-agnostic pointer event types.
pub mod event;
/// Pointer grabbers claiming the cursor for specific frames.
pub mod grab;

pub use bindings::{
    format_chord, parse_chord, BindingProfile, MouseAction, MouseBindings,
};
pub use controller::{GestureTarget, InteractionController};
pub use event::{Chord, Modifiers, MouseButton};
pub use grab::{HotspotGrabber, PointerGrabber};
