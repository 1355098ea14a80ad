//! Where the scene's nodes sit in world space.

use glam::{Mat4, Quat, Vec3};
use headspace_common::Transform;
use std::f32::consts::FRAC_PI_2;

/// Reactive surface node.
pub fn surface() -> Transform {
    Transform::from_position_scale(Vec3::new(0.0, 0.06, 0.0), Vec3::new(12.7, 11.9, 15.0))
}

/// Group holding both head sub-meshes.
pub fn head_group() -> Transform {
    Transform::from_position_scale(Vec3::new(0.0, -1.3, 0.0), Vec3::new(10.0, 10.9, 10.0))
}

/// Local transform shared by the eyes and head sub-meshes inside the group.
pub fn head_part() -> Transform {
    Transform {
        position: Vec3::new(0.0, -1.373, 0.0),
        rotation: Quat::from_rotation_x(FRAC_PI_2),
        scale: Vec3::ONE,
    }
}

/// World matrix of a head sub-mesh.
pub fn head_part_matrix() -> Mat4 {
    head_group().matrix() * head_part().matrix()
}
