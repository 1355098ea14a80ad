use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Hermite interpolation between `edge0` and `edge1`, clamped to `[0, 1]`.
///
/// `edge0` may exceed `edge1`, which yields a falling curve.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Pointer falloff: how far, and within what radius, vertices are pushed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Falloff {
    /// Planar distance at which the push reaches zero.
    pub threshold: f32,
    /// Displacement along the normal at zero distance.
    pub push: f32,
}

impl Falloff {
    pub const SUBTLE: Self = Self {
        threshold: 0.15,
        push: 0.2,
    };

    pub const DRAMATIC: Self = Self {
        threshold: 0.09,
        push: 0.6,
    };

    /// Proximity factor for a planar distance: 1 at zero, 0 at or beyond the
    /// threshold. Equivalent to `smoothstep(threshold, 0, distance)`, written
    /// with ascending edges to match the shader.
    pub fn proximity_at(&self, distance: f32) -> f32 {
        1.0 - smoothstep(0.0, self.threshold, distance)
    }

    /// Proximity of a vertex (object-space XY) to the pointer.
    pub fn proximity(&self, vertex_xy: Vec2, pointer: Vec2) -> f32 {
        self.proximity_at(vertex_xy.distance(pointer))
    }

    /// Vertex-stage displacement: push `position` along `normal`.
    pub fn displace(&self, position: Vec3, normal: Vec3, pointer: Vec2) -> Vec3 {
        position + normal * (self.push * self.proximity(position.truncate(), pointer))
    }
}

impl Default for Falloff {
    fn default() -> Self {
        Self::SUBTLE
    }
}
