use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection and clipping parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub field_of_view: f32,
    /// Ratio of the near plane floor to the clipped scene radius.
    #[schemars(skip)]
    pub z_near_coefficient: f32,
    /// How many scene radii the clipping planes keep visible around
    /// the scene center.
    #[schemars(skip)]
    pub z_clipping_coefficient: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            field_of_view: 45.0,
            z_near_coefficient: 0.005,
            z_clipping_coefficient: 3.0_f32.sqrt(),
        }
    }
}
