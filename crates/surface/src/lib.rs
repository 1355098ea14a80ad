//! Reactive surface: the mesh that bulges toward the pointer.
//!
//! The GPU shading program lives in the render backend; this crate holds the
//! data it consumes and CPU mirrors of both shader stages so the math can be
//! tested without a device.
//!
//! # Invariants
//! - Decoration is per triangle: the three vertices of a face share color and
//!   displacement.
//! - Decorated geometry is immutable once produced.
//! - Proximity is 1 at the pointer and 0 at or beyond the falloff threshold.

mod decorate;
mod falloff;
mod shading;

pub use decorate::{
    DISPLACEMENT_RANGE, DecorateError, DecoratedGeometry, LIGHTNESS_RANGE, decorate,
};
pub use falloff::{Falloff, smoothstep};
pub use shading::{AMBIENT, BASE_COLOR, BASE_REFLECTANCE, ShadingParams};
