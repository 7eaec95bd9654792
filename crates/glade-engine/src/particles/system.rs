use glam::{Mat4, Vec3};

use super::{ConfigError, ParticleConfig, ParticlePool, ParticleVertex, TickStats, VertexBuilder};

/// A pool plus its vertex stream, placed in the world at `origin`.
///
/// `update` is the once-per-frame entry point: tick the pool, then rebuild vertices.
pub struct ParticleSystem {
    pool: ParticlePool,
    builder: VertexBuilder,
    origin: Vec3,
    last_tick: TickStats,
}

impl ParticleSystem {
    /// Emitter position used by the garden scene.
    pub const DEFAULT_ORIGIN: Vec3 = Vec3::new(0.0, 5.5, -7.5);

    pub fn new(config: ParticleConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_pool(ParticlePool::new(config)?))
    }

    pub fn with_seed(config: ParticleConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self::from_pool(ParticlePool::with_seed(config, seed)?))
    }

    fn from_pool(pool: ParticlePool) -> Self {
        Self {
            builder: VertexBuilder::for_pool(&pool),
            pool,
            origin: Self::DEFAULT_ORIGIN,
            last_tick: TickStats::default(),
        }
    }

    /// Sets the world-space translation applied to the whole emitter.
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Advances the simulation by `elapsed_ms` and returns the new vertex stream.
    pub fn update(&mut self, elapsed_ms: f32) -> &[ParticleVertex] {
        self.last_tick = self.pool.tick(elapsed_ms);
        self.builder.build(&self.pool)
    }

    /// Rebuilds vertices without advancing time (e.g. while paused).
    pub fn rebuild(&mut self) -> &[ParticleVertex] {
        self.builder.build(&self.pool)
    }

    /// Clears every particle and the vertex stream.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.builder.build(&self.pool);
        self.last_tick = TickStats::default();
    }

    #[inline]
    pub fn vertices(&self) -> &[ParticleVertex] {
        self.builder.vertices()
    }

    #[inline]
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    #[inline]
    pub fn last_tick(&self) -> TickStats {
        self.last_tick
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Model matrix placing emitter space in the world.
    #[inline]
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.origin)
    }
}
