/// Window input the scene reacts to.
///
/// The desktop app translates platform events into these; the tracker never
/// sees raw windowing types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to a position in physical pixels, origin top-left.
    PointerMoved { x: f64, y: f64 },
    /// Drawable surface changed size, in physical pixels.
    Resized { width: u32, height: u32 },
}
