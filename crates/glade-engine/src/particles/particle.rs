use glam::Vec3;

use crate::paint::Rgb;

/// One pool slot.
///
/// The default value is an inactive slot at the origin.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub color: Rgb,

    /// Downward speed in units per second.
    pub velocity: f32,

    pub active: bool,
}

impl Particle {
    /// Creates an active particle.
    #[inline]
    pub const fn new(position: Vec3, color: Rgb, velocity: f32) -> Self {
        Self {
            position,
            color,
            velocity,
            active: true,
        }
    }

    /// Depth used for back-to-front ordering. Larger values are further away.
    #[inline]
    pub fn depth(&self) -> f32 {
        self.position.z
    }
}
