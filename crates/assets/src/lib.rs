//! Asset import for the headspace scene.
//!
//! Both scene assets are glTF 2.0 files. The head asset provides two named
//! sub-meshes with materials; the surface asset is any triangle mesh with
//! positions and normals. All geometry is handed out as non-indexed
//! [`TriangleSoup`] so per-triangle attributes can be attached later.

mod gltf_import;
mod mesh;

use std::path::PathBuf;

pub use gltf_import::{EYES_NODE_NAME, HEAD_NODE_NAMES, load_head_model, load_surface_mesh};
pub use mesh::TriangleSoup;
use serde::{Deserialize, Serialize};

/// Surface parameters taken from a glTF material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".into(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 1.0,
        }
    }
}

/// One named sub-mesh of the head model.
#[derive(Debug, Clone)]
pub struct HeadPart {
    pub node: String,
    pub geometry: TriangleSoup,
    pub material: Material,
}

/// The pre-authored head: eyes and head sub-meshes.
#[derive(Debug, Clone)]
pub struct HeadModel {
    pub eyes: HeadPart,
    pub head: HeadPart,
}

impl HeadModel {
    pub fn parts(&self) -> [&HeadPart; 2] {
        [&self.eyes, &self.head]
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("glTF import failed: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("node `{0}` not found")]
    MissingNode(String),
    #[error("node `{0}` has no mesh attached")]
    NodeWithoutMesh(String),
    #[error("mesh `{mesh}` uses {mode:?} primitives, only triangle lists are supported")]
    UnsupportedMode {
        mesh: String,
        mode: gltf::mesh::Mode,
    },
    #[error("mesh `{0}` has a primitive without positions")]
    MissingPositions(String),
    #[error("mesh `{0}` has a primitive without normals")]
    MissingNormals(String),
    #[error("mesh `{mesh}` has {positions} positions but {normals} normals")]
    AttributeCountMismatch {
        mesh: String,
        positions: usize,
        normals: usize,
    },
    #[error("mesh `{mesh}` references vertex {index} but only has {vertex_count}")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },
    #[error("no triangle geometry")]
    Empty(PathBuf),
}
