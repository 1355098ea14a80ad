mod color;
mod types;

pub use color::hsl_to_rgb;
pub use types::{Aabb, Transform};
