//! Centralized tuning options with TOML/JSON support.
//!
//! All serializable settings (camera projection, controller
//! sensitivities, mouse bindings) are consolidated here. Hosts load
//! presets from TOML or JSON strings; partial documents fill the rest
//! with defaults.

mod camera;
mod controller;

pub use camera::CameraOptions;
pub use controller::ControllerOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ViewError;
use crate::input::MouseBindings;

/// Top-level options container. All sub-structs use
/// `#[serde(default)]` so partial documents (e.g. only overriding
/// `[controller]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and clipping parameters.
    pub camera: CameraOptions,
    /// Gesture tuning for the interaction controller.
    pub controller: ControllerOptions,
    /// Mouse chord bindings.
    #[schemars(skip)]
    pub bindings: MouseBindings,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML document. Missing fields use
    /// defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ViewError> {
        toml::from_str(content)
            .map_err(|e| ViewError::OptionsParse(e.to_string()))
    }

    /// Serialize to pretty-printed TOML.
    pub fn to_toml_string(&self) -> Result<String, ViewError> {
        toml::to_string_pretty(self)
            .map_err(|e| ViewError::OptionsParse(e.to_string()))
    }

    /// Parse options from a JSON document. Missing fields use
    /// defaults.
    pub fn from_json_str(content: &str) -> Result<Self, ViewError> {
        serde_json::from_str(content)
            .map_err(|e| ViewError::OptionsParse(e.to_string()))
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ViewError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ViewError::OptionsParse(e.to_string()))
    }
}
