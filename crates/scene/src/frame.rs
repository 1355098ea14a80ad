use glam::Vec2;
use headspace_input::PointerTracker;

/// A shading program instance that consumes the pointer position.
pub trait PointerUniform {
    fn set_pointer(&mut self, pointer: Vec2);
}

/// Per-frame update: copy the tracked pointer into the program, if one is
/// live. Returns whether a program received the value.
pub fn push_pointer<P>(tracker: &PointerTracker, program: Option<&mut P>) -> bool
where
    P: PointerUniform + ?Sized,
{
    match program {
        Some(program) => {
            program.set_pointer(tracker.position());
            true
        }
        None => false,
    }
}
