use headspace_assets::TriangleSoup;
use headspace_common::hsl_to_rgb;
use rand::Rng;
use std::ops::Range;

/// Range of the per-face lightness draw.
pub const LIGHTNESS_RANGE: Range<f32> = 0.3..1.0;

/// Range of the per-face displacement draw.
pub const DISPLACEMENT_RANGE: Range<f32> = -0.025..0.025;

/// Hue of every face color (red).
const FACE_HUE: f32 = 0.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecorateError {
    #[error("vertex count {0} is not a multiple of 3; geometry must be a triangle list")]
    NotTriangleList(usize),
    #[error("{positions} positions but {normals} normals")]
    AttributeMismatch { positions: usize, normals: usize },
}

/// Surface geometry with per-face color and displacement attributes.
///
/// Produced once per loaded mesh by [`decorate`]; all four arrays have one
/// entry per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedGeometry {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    displacements: Vec<[f32; 3]>,
}

impl DecoratedGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Displacement magnitude replicated across three channels.
    pub fn displacements(&self) -> &[[f32; 3]] {
        &self.displacements
    }
}

/// Attach a random color and displacement to each triangle of `soup`.
pub fn decorate<R: Rng + ?Sized>(
    soup: &TriangleSoup,
    rng: &mut R,
) -> Result<DecoratedGeometry, DecorateError> {
    let vertex_count = soup.positions.len();
    if soup.normals.len() != vertex_count {
        return Err(DecorateError::AttributeMismatch {
            positions: vertex_count,
            normals: soup.normals.len(),
        });
    }
    if vertex_count % 3 != 0 {
        return Err(DecorateError::NotTriangleList(vertex_count));
    }

    let mut colors = Vec::with_capacity(vertex_count);
    let mut displacements = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count / 3 {
        let (lightness, d) = draw_face(rng);
        let color = hsl_to_rgb(FACE_HUE, 1.0, lightness);

        colors.extend([color; 3]);
        displacements.extend([[d; 3]; 3]);
    }

    tracing::debug!(triangles = vertex_count / 3, "surface decorated");
    Ok(DecoratedGeometry {
        positions: soup.positions.clone(),
        normals: soup.normals.clone(),
        colors,
        displacements,
    })
}

/// One lightness and one displacement draw for a face.
fn draw_face<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let lightness = rng.gen_range(LIGHTNESS_RANGE);
    let displacement = rng.gen_range(DISPLACEMENT_RANGE);
    (lightness, displacement)
}
