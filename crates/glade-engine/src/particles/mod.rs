//! Falling-particle simulation.
//!
//! Data flow per frame:
//! - `ParticlePool::tick(elapsed_ms)`: retire, emit, integrate
//! - `VertexBuilder::build(&pool)`: live particles to billboard triangles
//! - the vertex slice goes to `render::ParticleRenderer`
//!
//! `ParticleSystem` bundles the first two steps. Everything here is CPU-only and
//! single-threaded; the GPU side lives in `render`.

mod config;
mod particle;
mod pool;
mod system;
mod vertex;

pub use config::{ConfigError, EmissionPolicy, ParticleConfig};
pub use particle::Particle;
pub use pool::{ParticlePool, TickStats};
pub use system::ParticleSystem;
pub use vertex::{ParticleVertex, VertexBuilder, VERTICES_PER_PARTICLE};
