use glam::Vec3;
use headspace_common::Aabb;
use serde::{Deserialize, Serialize};

/// Non-indexed triangle geometry: every three consecutive vertices form one
/// triangle and no vertex is shared between triangles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleSoup {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
}

impl TriangleSoup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of complete triangles.
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append vertices read through an optional index list. Indexed input is
    /// expanded so each index produces its own vertex.
    pub fn extend_from(
        &mut self,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        indices: Option<&[u32]>,
    ) {
        match indices {
            Some(indices) => {
                for &i in indices {
                    self.positions.push(positions[i as usize]);
                    self.normals.push(normals[i as usize]);
                }
            }
            None => {
                self.positions.extend_from_slice(positions);
                self.normals.extend_from_slice(normals);
            }
        }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied().map(Vec3::from))
    }

    /// Translate the geometry so its bounding-box center sits at the origin.
    pub fn center(&mut self) -> Vec3 {
        let Some(bounds) = self.bounds() else {
            return Vec3::ZERO;
        };
        let offset = bounds.center();
        for p in &mut self.positions {
            *p = (Vec3::from(*p) - offset).to_array();
        }
        offset
    }
}
