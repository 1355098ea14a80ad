//! Input for the reactive scene.
//!
//! # Invariants
//! - Pointer state is owned by whoever holds the [`PointerTracker`]; there is
//!   no global listener.
//! - A detached tracker ignores every event.

pub mod event;
mod pointer;

pub use event::InputEvent;
pub use pointer::{PointerTracker, from_ndc, to_ndc};
