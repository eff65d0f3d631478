//! Chord-to-action binding tables.
//!
//! Two tables resolve a [`Chord`] to a [`MouseAction`]: one for
//! camera manipulation, one for frame (scene object) manipulation.
//! The runtime tables ([`BindingProfile`]) use `FxHashMap` keyed on
//! the chord; the serializable mirror ([`MouseBindings`]) uses string
//! keys like `"Shift+Left"` so profiles read naturally in TOML.

use std::collections::HashMap;

use rustc_hash::FxHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::event::{Chord, Modifiers, MouseButton};

/// What a mouse gesture does while its chord is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseAction {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Arcball rotation around the pivot point (camera) or the frame
    /// origin (frames).
    Rotate,
    /// Dolly along the view axis with vertical mouse motion.
    Zoom,
    /// Pan in the screen plane, scaled to stay under the cursor.
    Translate,
    /// Rotate about the view axis, following the cursor around the
    /// projected pivot.
    ScreenRotate,
    /// Translate constrained to the dominant screen axis.
    ScreenTranslate,
    /// Fly forward while pitch/yaw track the cursor. Camera only.
    MoveForward,
    /// Fly backward while pitch/yaw track the cursor. Camera only.
    MoveBackward,
    /// Fly forward with speed set by vertical cursor offset and yaw by
    /// horizontal offset. Camera only.
    Drive,
    /// Pitch/yaw without translating. Camera only.
    LookAround,
    /// Roll about the view axis with horizontal mouse motion.
    Roll,
    /// Rubber-band a rectangle, then fit the camera to it on release.
    ZoomOnRegion,
}

impl MouseAction {
    /// Snake-case tag used in serialized binding tables.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Rotate => "rotate",
            Self::Zoom => "zoom",
            Self::Translate => "translate",
            Self::ScreenRotate => "screen_rotate",
            Self::ScreenTranslate => "screen_translate",
            Self::MoveForward => "move_forward",
            Self::MoveBackward => "move_backward",
            Self::Drive => "drive",
            Self::LookAround => "look_around",
            Self::Roll => "roll",
            Self::ZoomOnRegion => "zoom_on_region",
        }
    }

    /// Parse a serialized tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "idle" => Self::Idle,
            "rotate" => Self::Rotate,
            "zoom" => Self::Zoom,
            "translate" => Self::Translate,
            "screen_rotate" => Self::ScreenRotate,
            "screen_translate" => Self::ScreenTranslate,
            "move_forward" => Self::MoveForward,
            "move_backward" => Self::MoveBackward,
            "drive" => Self::Drive,
            "look_around" => Self::LookAround,
            "roll" => Self::Roll,
            "zoom_on_region" => Self::ZoomOnRegion,
            _ => return None,
        })
    }
}

/// Runtime chord → action tables.
#[derive(Debug, Clone)]
pub struct BindingProfile {
    camera: FxHashMap<Chord, MouseAction>,
    frame: FxHashMap<Chord, MouseAction>,
}

impl Default for BindingProfile {
    /// Plain buttons drive the camera; the same buttons with Ctrl
    /// drive the interactive frame.
    fn default() -> Self {
        let mut camera = FxHashMap::default();
        let _ = camera
            .insert(Chord::plain(MouseButton::Left), MouseAction::Rotate);
        let _ = camera
            .insert(Chord::plain(MouseButton::Middle), MouseAction::Zoom);
        let _ = camera
            .insert(Chord::plain(MouseButton::Right), MouseAction::Translate);
        let _ = camera.insert(
            Chord::new(MouseButton::Middle, Modifiers::SHIFT),
            MouseAction::ZoomOnRegion,
        );
        let _ = camera.insert(
            Chord::new(MouseButton::Left, Modifiers::SHIFT),
            MouseAction::ScreenRotate,
        );
        let _ = camera.insert(
            Chord::new(MouseButton::Right, Modifiers::SHIFT),
            MouseAction::ScreenTranslate,
        );

        let mut frame = FxHashMap::default();
        let _ = frame.insert(
            Chord::new(MouseButton::Left, Modifiers::CTRL),
            MouseAction::Rotate,
        );
        let _ = frame.insert(
            Chord::new(MouseButton::Middle, Modifiers::CTRL),
            MouseAction::Zoom,
        );
        let _ = frame.insert(
            Chord::new(MouseButton::Right, Modifiers::CTRL),
            MouseAction::Translate,
        );

        Self { camera, frame }
    }
}

impl BindingProfile {
    /// Empty profile (nothing bound).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            camera: FxHashMap::default(),
            frame: FxHashMap::default(),
        }
    }

    /// The camera action bound to a chord, if any.
    #[must_use]
    pub fn camera_action(&self, chord: Chord) -> Option<MouseAction> {
        self.camera.get(&chord).copied()
    }

    /// The frame action bound to a chord, if any.
    #[must_use]
    pub fn frame_action(&self, chord: Chord) -> Option<MouseAction> {
        self.frame.get(&chord).copied()
    }

    /// Bind (or rebind) a camera chord.
    pub fn bind_camera(&mut self, chord: Chord, action: MouseAction) {
        let _ = self.camera.insert(chord, action);
    }

    /// Bind (or rebind) a frame chord.
    pub fn bind_frame(&mut self, chord: Chord, action: MouseAction) {
        let _ = self.frame.insert(chord, action);
    }
}

/// Serializable mirror of [`BindingProfile`]: chord strings like
/// `"Ctrl+Shift+Left"` mapped to snake-case action tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct MouseBindings {
    /// Camera gesture bindings.
    pub camera: HashMap<String, String>,
    /// Frame (scene object) gesture bindings.
    pub frame: HashMap<String, String>,
}

impl Default for MouseBindings {
    fn default() -> Self {
        Self::from_profile(&BindingProfile::default())
    }
}

impl MouseBindings {
    /// Serialize a runtime profile.
    #[must_use]
    pub fn from_profile(profile: &BindingProfile) -> Self {
        let export = |table: &FxHashMap<Chord, MouseAction>| {
            table
                .iter()
                .map(|(chord, action)| {
                    (format_chord(*chord), action.tag().to_owned())
                })
                .collect()
        };
        Self {
            camera: export(&profile.camera),
            frame: export(&profile.frame),
        }
    }

    /// Build the runtime tables. Unparsable chords or unknown action
    /// tags are logged and skipped, so a stale profile degrades
    /// instead of failing to load.
    #[must_use]
    pub fn to_profile(&self) -> BindingProfile {
        let mut profile = BindingProfile::empty();
        for (table, runtime) in [
            (&self.camera, &mut profile.camera),
            (&self.frame, &mut profile.frame),
        ] {
            for (key, tag) in table {
                let Some(chord) = parse_chord(key) else {
                    log::warn!("ignoring unparsable mouse chord {key:?}");
                    continue;
                };
                let Some(action) = MouseAction::from_tag(tag) else {
                    log::warn!("ignoring unknown mouse action {tag:?}");
                    continue;
                };
                let _ = runtime.insert(chord, action);
            }
        }
        profile
    }
}

/// `"Ctrl+Shift+Left"`-style display of a chord. Modifiers always come
/// out in Ctrl, Shift, Alt, Meta order.
#[must_use]
pub fn format_chord(chord: Chord) -> String {
    let mut out = String::new();
    if chord.modifiers.ctrl {
        out.push_str("Ctrl+");
    }
    if chord.modifiers.shift {
        out.push_str("Shift+");
    }
    if chord.modifiers.alt {
        out.push_str("Alt+");
    }
    if chord.modifiers.meta {
        out.push_str("Meta+");
    }
    out.push_str(match chord.button {
        MouseButton::Left => "Left",
        MouseButton::Middle => "Middle",
        MouseButton::Right => "Right",
    });
    out
}

/// Parse a `"Ctrl+Shift+Left"`-style chord. The last token must be a
/// button; modifier order is free.
#[must_use]
pub fn parse_chord(s: &str) -> Option<Chord> {
    let mut modifiers = Modifiers::NONE;
    let mut button = None;
    for token in s.split('+') {
        match token.trim() {
            "Ctrl" => modifiers.ctrl = true,
            "Shift" => modifiers.shift = true,
            "Alt" => modifiers.alt = true,
            "Meta" => modifiers.meta = true,
            "Left" => button = Some(MouseButton::Left),
            "Middle" => button = Some(MouseButton::Middle),
            "Right" => button = Some(MouseButton::Right),
            _ => return None,
        }
    }
    button.map(|b| Chord::new(b, modifiers))
}
