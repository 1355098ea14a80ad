use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Constant ambient term.
pub const AMBIENT: f32 = 0.1;

/// Gold.
pub const BASE_COLOR: Vec3 = Vec3::new(1.0, 0.843, 0.0);

/// Reflectance of a fully dielectric surface.
pub const BASE_REFLECTANCE: f32 = 0.04;

/// Scene-wide uniforms of the surface program, apart from the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingParams {
    /// Directional light, given as a position relative to the origin.
    pub light_position: Vec3,
    pub metalness: f32,
    pub roughness: f32,
    /// Carried to the shader but not used by either stage.
    pub time: f32,
    /// Multiply the base color by the per-face color.
    pub tint_faces: bool,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            light_position: Vec3::new(1.0, 1.0, 2.0),
            metalness: 0.5,
            roughness: 0.1,
            time: 0.0,
            tint_faces: false,
        }
    }
}

impl ShadingParams {
    /// Fragment-stage color for an interpolated normal.
    pub fn shade(&self, normal: Vec3, face_color: Vec3) -> Vec4 {
        let base = if self.tint_faces {
            BASE_COLOR * face_color
        } else {
            BASE_COLOR
        };
        let light = self.light_position.normalize_or_zero();
        let directional = normal.dot(light).max(0.0);

        let reflectance = Vec3::splat(BASE_REFLECTANCE).lerp(base, self.metalness);
        let diffuse = (1.0 - self.metalness) * base;
        let specular = reflectance * directional.powf((1.0 - self.roughness) * 128.0);

        let color = AMBIENT * base + (diffuse + specular) * directional;
        color.extend(1.0)
    }
}
