//! Platform-agnostic pointer events.
//!
//! The host translates its windowing toolkit's events into these
//! types and feeds them to the
//! [`InteractionController`](super::InteractionController). Positions
//! are physical pixels with y growing downward; times are host
//! milliseconds (any monotonic origin).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Platform-agnostic mouse button identifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Middle mouse button (wheel click).
    Middle,
    /// Secondary (right) mouse button.
    Right,
}

/// Keyboard modifier state accompanying a pointer event.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key held.
    pub shift: bool,
    /// Control key held.
    pub ctrl: bool,
    /// Alt/Option key held.
    pub alt: bool,
    /// Meta/Command/Windows key held.
    pub meta: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self { shift: true, ..Self::NONE };

    /// Control only.
    pub const CTRL: Self = Self { ctrl: true, ..Self::NONE };

    /// Alt only.
    pub const ALT: Self = Self { alt: true, ..Self::NONE };

    /// Meta only.
    pub const META: Self = Self { meta: true, ..Self::NONE };

    /// Whether no modifier is held.
    #[must_use]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

/// A button chord: the button plus the modifiers held with it. This is
/// the unit the binding tables key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    /// The pressed button.
    pub button: MouseButton,
    /// Modifier state at press time.
    pub modifiers: Modifiers,
}

impl Chord {
    /// Chord from a button with no modifiers.
    #[must_use]
    pub fn plain(button: MouseButton) -> Self {
        Self {
            button,
            modifiers: Modifiers::NONE,
        }
    }

    /// Chord from a button and modifiers.
    #[must_use]
    pub fn new(button: MouseButton, modifiers: Modifiers) -> Self {
        Self { button, modifiers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_constants_are_disjoint() {
        assert!(Modifiers::NONE.is_none());
        assert!(!Modifiers::SHIFT.is_none());
        assert_ne!(Modifiers::SHIFT, Modifiers::CTRL);
        assert_ne!(Chord::plain(MouseButton::Left), {
            Chord::new(MouseButton::Left, Modifiers::SHIFT)
        });
    }
}
