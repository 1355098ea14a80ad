use glam::{Mat4, Vec2, Vec3};

/// Perspective camera orbiting a target point.
/// Camera motion is view-only; it never feeds back into the scene.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub rotate_sensitivity: f32,
    pub pan_sensitivity: f32,
    pub zoom_sensitivity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 25.0,
            yaw: 0.0,
            pitch: 0.0,
            fov: 20.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            rotate_sensitivity: 0.005,
            pan_sensitivity: 0.0015,
            zoom_sensitivity: 0.1,
        }
    }
}

impl OrbitCamera {
    const MIN_DISTANCE: f32 = 0.5;
    const MAX_DISTANCE: f32 = 500.0;

    /// World-space eye position.
    pub fn position(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + offset * self.distance
    }

    /// Orbit by a cursor delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.rotate_sensitivity;
        self.pitch += delta.y * self.rotate_sensitivity;
        self.pitch = self.pitch.clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    /// Slide target and eye together in the view plane.
    pub fn pan(&mut self, delta: Vec2) {
        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        let scale = self.pan_sensitivity * self.distance;
        self.target += (-delta.x * right + delta.y * up) * scale;
    }

    /// Positive `amount` moves closer.
    pub fn zoom(&mut self, amount: f32) {
        let factor = (1.0 - amount * self.zoom_sensitivity).max(0.1);
        self.distance = (self.distance * factor).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
