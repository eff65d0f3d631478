use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Controller", inline)]
#[serde(default)]
/// Gesture tuning for the interaction controller.
pub struct ControllerOptions {
    /// Rotation sensitivity multiplier.
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub rotation_sensitivity: f32,
    /// Pan sensitivity multiplier.
    #[schemars(title = "Pan Speed", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub translation_sensitivity: f32,
    /// Drag-zoom sensitivity multiplier.
    #[schemars(title = "Zoom Speed", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub zoom_sensitivity: f32,
    /// Wheel-zoom sensitivity multiplier.
    #[schemars(title = "Wheel Speed", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub wheel_sensitivity: f32,
    /// Cursor speed (px/ms) at release above which a rotation keeps
    /// spinning.
    #[schemars(skip)]
    pub spinning_sensitivity: f32,
    /// Fly translation per update in world units; 0 uses 1% of the
    /// scene radius.
    #[schemars(skip)]
    pub fly_speed: f32,
    /// Milliseconds between fly updates.
    #[schemars(skip)]
    pub fly_update_period_ms: f32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 1.0,
            translation_sensitivity: 1.0,
            zoom_sensitivity: 1.0,
            wheel_sensitivity: 1.0,
            spinning_sensitivity: 1.15,
            fly_speed: 0.0,
            fly_update_period_ms: 40.0,
        }
    }
}
