use glam::{Mat4, Vec3};

/// Left-handed fly camera: +Z forward, +Y up.
///
/// Left-handed so that larger particle `z` means further away, matching the
/// pool's back-to-front order.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Radians around +Y.
    pub yaw: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 8.0, -22.0),
            yaw: 0.0,
            fov_y: std::f32::consts::PI / 2.5,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Units per second for keyboard movement.
    pub const MOVE_SPEED: f32 = 5.0;

    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Moves along the view direction (positive) or backwards (negative).
    pub fn move_forward(&mut self, dt_secs: f32, direction: f32) {
        self.position += self.forward() * direction * Self::MOVE_SPEED * dt_secs;
    }

    pub fn strafe(&mut self, dt_secs: f32, direction: f32) {
        self.position += self.right() * direction * Self::MOVE_SPEED * dt_secs;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_lh(self.position, self.forward(), Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }
}
