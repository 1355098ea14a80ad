use crate::InputEvent;
use glam::{DVec2, Vec2};

/// Map a pixel position to normalized device coordinates: `[-1, 1]` on both
/// axes with Y pointing up. Positions outside the surface map outside the range.
pub fn to_ndc(pixel: DVec2, size: DVec2) -> Vec2 {
    Vec2::new(
        (pixel.x / size.x * 2.0 - 1.0) as f32,
        (-(pixel.y / size.y) * 2.0 + 1.0) as f32,
    )
}

/// Inverse of [`to_ndc`].
pub fn from_ndc(ndc: Vec2, size: DVec2) -> DVec2 {
    DVec2::new(
        (f64::from(ndc.x) + 1.0) / 2.0 * size.x,
        (1.0 - f64::from(ndc.y)) / 2.0 * size.y,
    )
}

/// Pointer position in NDC, updated from input events while attached.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    position: Vec2,
    surface: DVec2,
    attached: bool,
}

impl PointerTracker {
    /// A detached tracker at the origin for a surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            surface: DVec2::new(f64::from(width), f64::from(height)),
            attached: false,
        }
    }

    pub fn attach(&mut self) {
        if !self.attached {
            tracing::debug!("pointer tracker attached");
        }
        self.attached = true;
    }

    pub fn detach(&mut self) {
        if self.attached {
            tracing::debug!("pointer tracker detached");
        }
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Current pointer position in NDC.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Apply one input event. Returns whether the pointer position changed.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        if !self.attached {
            return false;
        }
        match *event {
            InputEvent::Resized { width, height } => {
                self.surface = DVec2::new(f64::from(width), f64::from(height));
                false
            }
            InputEvent::PointerMoved { x, y } => {
                if self.surface.x <= 0.0 || self.surface.y <= 0.0 {
                    tracing::debug!("pointer event on zero-sized surface ignored");
                    return false;
                }
                self.position = to_ndc(DVec2::new(x, y), self.surface);
                true
            }
        }
    }
}
