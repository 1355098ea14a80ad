use crate::{AssetError, HeadModel, HeadPart, Material, TriangleSoup};
use gltf::mesh::Mode;
use std::path::Path;

/// Node name of the eyes sub-mesh.
pub const EYES_NODE_NAME: &str = "Eyes";

/// Accepted node names for the head sub-mesh, in lookup order.
pub const HEAD_NODE_NAMES: [&str; 2] = ["Head", "Male_Head"];

/// Load the head model: the `Eyes` node and the `Head` (or `Male_Head`) node,
/// each with the material of its first primitive.
pub fn load_head_model(path: impl AsRef<Path>) -> Result<HeadModel, AssetError> {
    let path = path.as_ref();
    let (document, buffers, _) = import(path)?;

    let eyes = read_part(&document, &buffers, &[EYES_NODE_NAME])?;
    let head = read_part(&document, &buffers, &HEAD_NODE_NAMES)?;

    tracing::info!(
        path = %path.display(),
        eyes_triangles = eyes.geometry.triangle_count(),
        head_triangles = head.geometry.triangle_count(),
        "head model loaded"
    );
    Ok(HeadModel { eyes, head })
}

/// Load every triangle primitive of every mesh in the file into one soup.
pub fn load_surface_mesh(path: impl AsRef<Path>) -> Result<TriangleSoup, AssetError> {
    let path = path.as_ref();
    let (document, buffers, _) = import(path)?;

    let mut soup = TriangleSoup::new();
    for mesh in document.meshes() {
        read_mesh(&mesh, &buffers, &mut soup)?;
    }
    if soup.is_empty() {
        return Err(AssetError::Empty(path.to_path_buf()));
    }

    tracing::info!(
        path = %path.display(),
        vertices = soup.vertex_count(),
        "surface mesh loaded"
    );
    Ok(soup)
}

fn import(
    path: &Path,
) -> Result<(gltf::Document, Vec<gltf::buffer::Data>, Vec<gltf::image::Data>), AssetError> {
    gltf::import(path).map_err(|source| AssetError::Import {
        path: path.to_path_buf(),
        source,
    })
}

fn read_part(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    names: &[&str],
) -> Result<HeadPart, AssetError> {
    let node = names
        .iter()
        .find_map(|name| document.nodes().find(|n| n.name() == Some(*name)))
        .ok_or_else(|| AssetError::MissingNode(names.join("|")))?;
    let node_name = node.name().unwrap_or_default().to_string();
    let mesh = node
        .mesh()
        .ok_or_else(|| AssetError::NodeWithoutMesh(node_name.clone()))?;

    let mut geometry = TriangleSoup::new();
    read_mesh(&mesh, buffers, &mut geometry)?;

    let material = mesh
        .primitives()
        .next()
        .map(|p| p.material())
        .filter(|m| m.index().is_some())
        .map(convert_material)
        .unwrap_or_default();

    Ok(HeadPart {
        node: node_name,
        geometry,
        material,
    })
}

fn read_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    soup: &mut TriangleSoup,
) -> Result<(), AssetError> {
    let mesh_name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            return Err(AssetError::UnsupportedMode {
                mesh: mesh_name,
                mode: primitive.mode(),
            });
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| AssetError::MissingPositions(mesh_name.clone()))?
            .collect();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .ok_or_else(|| AssetError::MissingNormals(mesh_name.clone()))?
            .collect();
        let indices: Option<Vec<u32>> = reader.read_indices().map(|i| i.into_u32().collect());

        if positions.len() != normals.len() {
            return Err(AssetError::AttributeCountMismatch {
                mesh: mesh_name,
                positions: positions.len(),
                normals: normals.len(),
            });
        }

        let vertex_count = positions.len();
        if let Some(&index) = indices
            .as_deref()
            .and_then(|i| i.iter().find(|&&i| i as usize >= vertex_count))
        {
            return Err(AssetError::IndexOutOfRange {
                mesh: mesh_name,
                index,
                vertex_count,
            });
        }

        tracing::debug!(
            mesh = %mesh_name,
            vertices = positions.len(),
            indexed = indices.is_some(),
            "reading primitive"
        );
        soup.extend_from(&positions, &normals, indices.as_deref());
    }
    Ok(())
}

fn convert_material(material: gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    Material {
        name: material.name().unwrap_or("material").to_string(),
        base_color: pbr.base_color_factor(),
        metallic: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::path::PathBuf;

    /// Geometry variants written by [`write_fixture`].
    #[derive(Clone, Copy)]
    enum Shape {
        Triangle,
        IndexedQuad,
    }

    struct Fixture<'a> {
        nodes: &'a [&'a str],
        shape: Shape,
        mode: u32,
        normals: bool,
        normal_count: Option<usize>,
    }

    impl Default for Fixture<'_> {
        fn default() -> Self {
            Self {
                nodes: &["Surface"],
                shape: Shape::Triangle,
                mode: 4,
                normals: true,
                normal_count: None,
            }
        }
    }

    fn write_fixture(dir: &Path, fixture: Fixture<'_>) -> PathBuf {
        let positions: Vec<[f32; 3]> = match fixture.shape {
            Shape::Triangle => vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Shape::IndexedQuad => vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
        };
        let indices: &[u16] = &[0, 1, 2, 2, 3, 0];

        let mut bin = Vec::new();
        for p in &positions {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        let normal_count = fixture.normal_count.unwrap_or(positions.len());
        let normals_offset = bin.len();
        for _ in 0..normal_count {
            for c in [0.0f32, 0.0, 1.0] {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        let indices_offset = bin.len();
        if matches!(fixture.shape, Shape::IndexedQuad) {
            for i in indices {
                bin.extend_from_slice(&i.to_le_bytes());
            }
        }
        std::fs::write(dir.join("fixture.bin"), &bin).unwrap();

        let count = positions.len();
        let mut attributes = json!({ "POSITION": 0 });
        if fixture.normals {
            attributes["NORMAL"] = json!(1);
        }

        let meshes: Vec<Value> = fixture
            .nodes
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut primitive = json!({
                    "attributes": attributes,
                    "mode": fixture.mode,
                    "material": i,
                });
                if matches!(fixture.shape, Shape::IndexedQuad) {
                    primitive["indices"] = json!(2);
                }
                json!({ "name": format!("{name}_mesh"), "primitives": [primitive] })
            })
            .collect();
        let nodes: Vec<Value> = fixture
            .nodes
            .iter()
            .enumerate()
            .map(|(i, name)| json!({ "name": name, "mesh": i }))
            .collect();
        let materials: Vec<Value> = fixture
            .nodes
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "name": format!("{name}_material"),
                    "pbrMetallicRoughness": {
                        "baseColorFactor": [1.0, 0.5, i as f32 * 0.25, 1.0],
                        "metallicFactor": 0.2,
                        "roughnessFactor": 0.7,
                    }
                })
            })
            .collect();

        let mut accessors = vec![
            json!({
                "bufferView": 0, "componentType": 5126, "count": count, "type": "VEC3",
                "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0],
            }),
            json!({
                "bufferView": 1, "componentType": 5126, "count": normal_count, "type": "VEC3",
            }),
        ];
        let mut buffer_views = vec![
            json!({ "buffer": 0, "byteOffset": 0, "byteLength": normals_offset }),
            json!({
                "buffer": 0,
                "byteOffset": normals_offset,
                "byteLength": indices_offset - normals_offset,
            }),
        ];
        if matches!(fixture.shape, Shape::IndexedQuad) {
            accessors.push(json!({
                "bufferView": 2, "componentType": 5123, "count": indices.len(), "type": "SCALAR",
            }));
            buffer_views.push(json!({
                "buffer": 0,
                "byteOffset": indices_offset,
                "byteLength": bin.len() - indices_offset,
            }));
        }

        let document = json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": (0..fixture.nodes.len()).collect::<Vec<_>>() }],
            "nodes": nodes,
            "meshes": meshes,
            "materials": materials,
            "buffers": [{ "uri": "fixture.bin", "byteLength": bin.len() }],
            "bufferViews": buffer_views,
            "accessors": accessors,
        });

        let path = dir.join("fixture.gltf");
        std::fs::write(&path, serde_json::to_vec_pretty(&document).unwrap()).unwrap();
        path
    }

    #[test]
    fn surface_triangle() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), Fixture::default());

        let soup = load_surface_mesh(&path).unwrap();
        assert_eq!(soup.vertex_count(), 3);
        assert_eq!(soup.normals, vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn surface_indexed_geometry_becomes_soup() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            Fixture {
                shape: Shape::IndexedQuad,
                ..Fixture::default()
            },
        );

        let soup = load_surface_mesh(&path).unwrap();
        assert_eq!(soup.vertex_count(), 6);
        assert_eq!(soup.triangle_count(), 2);
        assert_eq!(soup.positions[2], soup.positions[3]);
    }

    #[test]
    fn surface_merges_all_meshes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            Fixture {
                nodes: &["A", "B"],
                ..Fixture::default()
            },
        );

        let soup = load_surface_mesh(&path).unwrap();
        assert_eq!(soup.triangle_count(), 2);
    }

    #[test]
    fn rejects_non_triangle_primitives() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            Fixture {
                mode: 1,
                ..Fixture::default()
            },
        );

        let err = load_surface_mesh(&path).unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedMode { .. }));
    }

    #[test]
    fn rejects_missing_normals() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            Fixture {
                normals: false,
                ..Fixture::default()
            },
        );

        let err = load_surface_mesh(&path).unwrap_err();
        assert!(matches!(err, AssetError::MissingNormals(_)));
    }

    #[test]
    fn rejects_normal_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            Fixture {
                shape: Shape::IndexedQuad,
                normal_count: Some(3),
                ..Fixture::default()
            },
        );

        let err = load_surface_mesh(&path).unwrap_err();
        assert!(matches!(
            err,
            AssetError::AttributeCountMismatch {
                positions: 4,
                normals: 3,
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_import_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.gltf");
        let err = load_surface_mesh(&missing).unwrap_err();
        assert!(matches!(err, AssetError::Import { ref path, .. } if *path == missing));
    }

    #[test]
    fn head_model_with_named_parts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            Fixture {
                nodes: &["Eyes", "Male_Head"],
                ..Fixture::default()
            },
        );

        let model = load_head_model(&path).unwrap();
        assert_eq!(model.eyes.node, "Eyes");
        assert_eq!(model.head.node, "Male_Head");
        assert_eq!(model.eyes.material.name, "Eyes_material");
        assert_eq!(model.head.material.base_color, [1.0, 0.5, 0.25, 1.0]);
        assert!((model.head.material.roughness - 0.7).abs() < 1e-6);
        assert_eq!(model.head.geometry.vertex_count(), 3);
    }

    #[test]
    fn head_model_missing_eyes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            Fixture {
                nodes: &["Head"],
                ..Fixture::default()
            },
        );

        let err = load_head_model(&path).unwrap_err();
        assert!(matches!(err, AssetError::MissingNode(ref n) if n == "Eyes"));
    }
}
