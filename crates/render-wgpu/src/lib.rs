//! wgpu render backend for the reactive head scene.
//!
//! Draws the head sub-meshes and the reactive surface program under an
//! orbit camera.
//!
//! # Invariants
//! - The renderer never mutates scene data; it only uploads it.
//! - The surface pointer uniform changes only through `PointerUniform`.
//! - Camera motion is view-only.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::{SceneRenderer, SurfaceProgram};
