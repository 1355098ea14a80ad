use crate::SceneConfig;
use headspace_assets::{AssetError, HeadModel, load_head_model, load_surface_mesh};
use headspace_surface::{DecorateError, DecoratedGeometry, decorate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("head model {path}: {source}")]
    Head {
        path: PathBuf,
        #[source]
        source: AssetError,
    },
    #[error("surface mesh {path}: {source}")]
    Surface {
        path: PathBuf,
        #[source]
        source: AssetError,
    },
    #[error("surface decoration: {0}")]
    Decorate(#[from] DecorateError),
}

/// Scene assets after load and decoration, ready for upload.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub head: HeadModel,
    pub surface: DecoratedGeometry,
}

/// Delivered to the event loop when background loading finishes.
#[derive(Debug)]
pub enum SceneEvent {
    AssetsLoaded(Box<LoadedScene>),
    LoadFailed(String),
}

impl SceneEvent {
    pub fn from_result(result: Result<LoadedScene, LoadError>) -> Self {
        match result {
            Ok(scene) => SceneEvent::AssetsLoaded(Box::new(scene)),
            Err(e) => SceneEvent::LoadFailed(e.to_string()),
        }
    }
}

/// Load both assets, center the surface and decorate it.
pub fn load_scene(config: &SceneConfig) -> Result<LoadedScene, LoadError> {
    let head = load_head_model(&config.head_path).map_err(|source| LoadError::Head {
        path: config.head_path.clone(),
        source,
    })?;

    let mut soup =
        load_surface_mesh(&config.surface_path).map_err(|source| LoadError::Surface {
            path: config.surface_path.clone(),
            source,
        })?;
    let offset = soup.center();
    tracing::debug!(?offset, "surface centered");

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let surface = decorate(&soup, &mut rng)?;

    tracing::info!(
        triangles = surface.triangle_count(),
        seed = ?config.seed,
        "scene assets ready"
    );
    Ok(LoadedScene { head, surface })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    /// Write `<stem>.gltf` with one non-indexed mesh shared by every named node.
    fn write_gltf(dir: &Path, stem: &str, nodes: &[&str], positions: &[[f32; 3]]) -> PathBuf {
        let mut bin = Vec::new();
        for p in positions {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        let normals_offset = bin.len();
        for _ in positions {
            for c in [0.0f32, 0.0, 1.0] {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        let bin_name = format!("{stem}.bin");
        std::fs::write(dir.join(&bin_name), &bin).unwrap();

        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }

        let count = positions.len();
        let document = json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": (0..nodes.len()).collect::<Vec<_>>() }],
            "nodes": nodes.iter().map(|n| json!({ "name": n, "mesh": 0 })).collect::<Vec<_>>(),
            "meshes": [{
                "name": format!("{stem}_mesh"),
                "primitives": [{ "attributes": { "POSITION": 0, "NORMAL": 1 }, "mode": 4 }],
            }],
            "buffers": [{ "uri": bin_name, "byteLength": bin.len() }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": normals_offset },
                {
                    "buffer": 0,
                    "byteOffset": normals_offset,
                    "byteLength": bin.len() - normals_offset,
                },
            ],
            "accessors": [
                {
                    "bufferView": 0, "componentType": 5126, "count": count, "type": "VEC3",
                    "min": min, "max": max,
                },
                { "bufferView": 1, "componentType": 5126, "count": count, "type": "VEC3" },
            ],
        });

        let path = dir.join(format!("{stem}.gltf"));
        std::fs::write(&path, serde_json::to_vec_pretty(&document).unwrap()).unwrap();
        path
    }

    fn fixture_config(dir: &Path) -> SceneConfig {
        let triangle = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        // Two triangles away from the origin, bounding box centered at (5, 3, 1).
        let surface = [
            [4.0, 2.0, 0.0],
            [6.0, 2.0, 0.0],
            [4.0, 4.0, 2.0],
            [6.0, 2.0, 0.0],
            [6.0, 4.0, 2.0],
            [4.0, 4.0, 2.0],
        ];
        SceneConfig {
            head_path: write_gltf(dir, "head", &["Eyes", "Head"], &triangle),
            surface_path: write_gltf(dir, "surface", &["Surface"], &surface),
            seed: Some(42),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn loads_centers_and_decorates_surface() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_config(dir.path());

        let scene = load_scene(&config).unwrap();
        assert_eq!(scene.head.eyes.node, "Eyes");
        assert_eq!(scene.head.head.node, "Head");

        let surface = &scene.surface;
        assert_eq!(surface.triangle_count(), 2);
        let bounds = headspace_common::Aabb::from_points(
            surface.positions().iter().map(|p| glam::Vec3::from_array(*p)),
        )
        .unwrap();
        assert!(bounds.center().length() < 1e-6);
        assert_eq!(bounds.max, glam::Vec3::new(1.0, 1.0, 1.0));

        for (colors, displacements) in surface
            .colors()
            .chunks_exact(3)
            .zip(surface.displacements().chunks_exact(3))
        {
            assert!(colors.iter().all(|c| *c == colors[0]));
            assert!(displacements.iter().all(|d| *d == displacements[0]));
        }
    }

    #[test]
    fn same_seed_same_decoration() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_config(dir.path());

        let first = load_scene(&config).unwrap();
        let second = load_scene(&config).unwrap();
        assert_eq!(first.surface, second.surface);
    }

    #[test]
    fn surface_error_names_the_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = SceneConfig {
            surface_path: dir.path().join("surface.glb"),
            ..fixture_config(dir.path())
        };

        let message = load_scene(&config).unwrap_err().to_string();
        assert_eq!(message.matches("surface.glb").count(), 1);
    }

    #[test]
    fn missing_head_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SceneConfig {
            head_path: dir.path().join("head.glb"),
            surface_path: dir.path().join("surface.glb"),
            ..SceneConfig::default()
        };

        let err = load_scene(&config).unwrap_err();
        assert!(matches!(err, LoadError::Head { .. }));
        assert!(err.to_string().contains("head.glb"));
    }

    #[test]
    fn failure_becomes_event_message() {
        let err = LoadError::Decorate(DecorateError::NotTriangleList(4));
        match SceneEvent::from_result(Err(err)) {
            SceneEvent::LoadFailed(message) => assert!(message.contains("multiple of 3")),
            SceneEvent::AssetsLoaded(_) => panic!("expected failure"),
        }
    }
}
