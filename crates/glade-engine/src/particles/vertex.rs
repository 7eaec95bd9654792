use bytemuck::{Pod, Zeroable};

use super::{Particle, ParticlePool};

/// Vertices emitted per live particle (two triangles).
pub const VERTICES_PER_PARTICLE: usize = 6;

/// Billboard vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl ParticleVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Corner sign (x, y) and texture coordinate for each vertex of a quad.
///
/// Triangle 1: bottom-left, top-left, bottom-right.
/// Triangle 2: bottom-right, top-left, top-right.
const QUAD_CORNERS: [([f32; 2], [f32; 2]); VERTICES_PER_PARTICLE] = [
    ([-1.0, -1.0], [0.0, 1.0]),
    ([-1.0, 1.0], [0.0, 0.0]),
    ([1.0, -1.0], [1.0, 1.0]),
    ([1.0, -1.0], [1.0, 1.0]),
    ([-1.0, 1.0], [0.0, 0.0]),
    ([1.0, 1.0], [1.0, 0.0]),
];

/// Turns the live prefix of a [`ParticlePool`] into a flat triangle list.
///
/// The buffer is sized for the pool's full capacity once and reused every frame.
/// Everything past the written vertices is kept zeroed, so a frame with fewer
/// particles than the previous one never exposes stale quads.
#[derive(Debug, Default)]
pub struct VertexBuilder {
    vertices: Vec<ParticleVertex>,
    vertex_count: usize,
}

impl VertexBuilder {
    /// Creates a builder able to hold `capacity` particles without reallocating.
    pub fn new(capacity: usize) -> Self {
        Self {
            vertices: vec![ParticleVertex::zeroed(); capacity * VERTICES_PER_PARTICLE],
            vertex_count: 0,
        }
    }

    /// Creates a builder sized for `pool`.
    pub fn for_pool(pool: &ParticlePool) -> Self {
        Self::new(pool.capacity())
    }

    /// Rebuilds the vertex stream from `pool` and returns the written vertices.
    ///
    /// Output depends only on the pool's live particles and its `particle_size`;
    /// building twice from an unchanged pool yields identical data.
    pub fn build(&mut self, pool: &ParticlePool) -> &[ParticleVertex] {
        let live = pool.live();
        let half = pool.config().particle_size;
        let needed = live.len() * VERTICES_PER_PARTICLE;

        if needed > self.vertices.len() {
            self.vertices.resize(needed, ParticleVertex::zeroed());
        }

        for (quad, particle) in self
            .vertices
            .chunks_exact_mut(VERTICES_PER_PARTICLE)
            .zip(live)
        {
            write_quad(quad, particle, half);
        }

        // Tail past `needed` was zero before the previous build; only the part that
        // build wrote needs clearing.
        if self.vertex_count > needed {
            self.vertices[needed..self.vertex_count].fill(ParticleVertex::zeroed());
        }

        self.vertex_count = needed;
        &self.vertices[..needed]
    }

    /// Vertices written by the last build.
    #[inline]
    pub fn vertices(&self) -> &[ParticleVertex] {
        &self.vertices[..self.vertex_count]
    }

    /// The whole buffer, including the zeroed tail.
    #[inline]
    pub fn buffer(&self) -> &[ParticleVertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

fn write_quad(quad: &mut [ParticleVertex], particle: &Particle, half: f32) {
    let p = particle.position;
    let color = particle.color.with_alpha(1.0);

    for (vertex, (sign, uv)) in quad.iter_mut().zip(QUAD_CORNERS) {
        *vertex = ParticleVertex {
            position: [p.x + sign[0] * half, p.y + sign[1] * half, p.z],
            uv,
            color,
        };
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::paint::Rgb;
    use crate::particles::ParticleConfig;

    fn quiet_pool(capacity: usize) -> ParticlePool {
        let cfg = ParticleConfig {
            capacity,
            emission_rate: 1e-3,
            particle_size: 0.5,
            ..Default::default()
        };
        ParticlePool::with_seed(cfg, 5).unwrap()
    }

    #[test]
    fn vertex_layout_stride_matches_struct() {
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 36);
        assert_eq!(ParticleVertex::layout().array_stride, 36);
    }

    #[test]
    fn empty_pool_builds_nothing() {
        let pool = quiet_pool(4);
        let mut builder = VertexBuilder::for_pool(&pool);
        assert!(builder.build(&pool).is_empty());
        assert_eq!(builder.buffer().len(), 24);
    }

    #[test]
    fn quad_corners_follow_winding() {
        let mut pool = quiet_pool(4);
        pool.insert(Particle::new(Vec3::new(1.0, 2.0, 3.0), Rgb::new(0.1, 0.2, 0.3), 1.0));

        let mut builder = VertexBuilder::for_pool(&pool);
        let v = builder.build(&pool);
        assert_eq!(v.len(), 6);

        let positions: Vec<[f32; 3]> = v.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [0.5, 1.5, 3.0], // bottom-left
                [0.5, 2.5, 3.0], // top-left
                [1.5, 1.5, 3.0], // bottom-right
                [1.5, 1.5, 3.0], // bottom-right
                [0.5, 2.5, 3.0], // top-left
                [1.5, 2.5, 3.0], // top-right
            ]
        );

        let uvs: Vec<[f32; 2]> = v.iter().map(|v| v.uv).collect();
        assert_eq!(
            uvs,
            vec![[0.0, 1.0], [0.0, 0.0], [1.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]]
        );

        assert!(v.iter().all(|v| v.color == [0.1, 0.2, 0.3, 1.0]));
    }

    #[test]
    fn quads_follow_pool_depth_order() {
        let mut pool = quiet_pool(8);
        for z in [1.0, 5.0, 3.0] {
            pool.insert(Particle::new(Vec3::new(0.0, 0.0, z), Rgb::white(), 1.0));
        }

        let mut builder = VertexBuilder::for_pool(&pool);
        let zs: Vec<f32> = builder
            .build(&pool)
            .chunks_exact(VERTICES_PER_PARTICLE)
            .map(|quad| quad[0].position[2])
            .collect();
        assert_eq!(zs, vec![5.0, 3.0, 1.0]);
        assert_eq!(builder.vertex_count(), 18);
    }

    #[test]
    fn shrinking_stream_zeroes_stale_tail() {
        let mut pool = quiet_pool(8);
        for i in 0..4 {
            pool.insert(Particle::new(Vec3::new(0.0, 0.0, i as f32), Rgb::white(), 1.0));
        }
        let mut builder = VertexBuilder::for_pool(&pool);
        builder.build(&pool);
        assert_eq!(builder.vertex_count(), 24);

        pool.reset();
        pool.insert(Particle::new(Vec3::ZERO, Rgb::white(), 1.0));
        builder.build(&pool);

        assert_eq!(builder.vertex_count(), 6);
        assert!(builder.buffer()[6..].iter().all(|v| *v == ParticleVertex::zeroed()));
    }

    #[test]
    fn building_twice_is_bit_identical() {
        let cfg = ParticleConfig { capacity: 256, ..Default::default() };
        let mut pool = ParticlePool::with_seed(cfg, 9).unwrap();
        for _ in 0..100 {
            pool.tick(16.0);
        }

        let mut builder = VertexBuilder::for_pool(&pool);
        let first: Vec<u8> = bytemuck::cast_slice(builder.build(&pool)).to_vec();
        let second: Vec<u8> = bytemuck::cast_slice(builder.build(&pool)).to_vec();

        assert_eq!(first.len(), pool.live_count() * VERTICES_PER_PARTICLE * 36);
        assert_eq!(first, second);
    }

    #[test]
    fn undersized_builder_grows() {
        let mut pool = quiet_pool(8);
        for _ in 0..3 {
            pool.insert(Particle::new(Vec3::ZERO, Rgb::white(), 1.0));
        }
        let mut builder = VertexBuilder::default();
        assert_eq!(builder.build(&pool).len(), 18);
    }
}
