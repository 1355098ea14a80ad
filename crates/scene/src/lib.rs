//! Scene composition for the reactive head demo.
//!
//! Ties the asset, surface and input crates together without touching the
//! GPU: what to load, where to place it, when to reveal it, and how the
//! pointer reaches the surface program each frame.
//!
//! # Invariants
//! - Decoration happens once, in [`load_scene`], producing immutable geometry.
//! - The pointer uniform is written only through [`push_pointer`].

mod config;
mod frame;
mod load;
pub mod placement;
mod status;

pub use config::{ConfigError, Preset, SceneConfig};
pub use frame::{PointerUniform, push_pointer};
pub use load::{LoadError, LoadedScene, SceneEvent, load_scene};
pub use status::{LoadState, SceneStatus};
