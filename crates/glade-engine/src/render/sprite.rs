/// CPU-side RGBA8 sprite sampled by every particle quad.
///
/// Texels are premultiplied white, so the fragment color is `texel * vertex color`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSprite {
    size: u32,
    pixels: Vec<u8>,
}

impl ParticleSprite {
    /// Default edge length for the soft disc.
    pub const DEFAULT_SIZE: u32 = 64;

    /// Square sprite with a quadratic radial falloff: opaque at the centre, fully
    /// transparent at and beyond the inscribed circle.
    pub fn soft_disc(size: u32) -> Self {
        let size = size.max(1);
        let radius = size as f32 * 0.5;

        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 + 0.5 - radius) / radius;
                let dy = (y as f32 + 0.5 - radius) / radius;
                let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                let v = (falloff * falloff * 255.0).round() as u8;
                pixels.extend_from_slice(&[v, v, v, v]);
            }
        }

        Self { size, pixels }
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Tightly packed RGBA8 rows.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the texel at `(x, y)`, or `None` outside the sprite.
    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let i = ((y * self.size + x) * 4) as usize;
        let t = self.pixels.get(i..i + 4)?;
        Some([t[0], t[1], t[2], t[3]])
    }
}

impl Default for ParticleSprite {
    fn default() -> Self {
        Self::soft_disc(Self::DEFAULT_SIZE)
    }
}
