//! GPU rendering.
//!
//! Renderers own their GPU resources and create them lazily on first use, so a
//! renderer can be constructed before a device exists. The particle renderer is the
//! sink for `particles::ParticleSystem` output.

mod ctx;
mod particles;
mod sprite;

pub use ctx::{RenderCtx, RenderTarget};
pub use particles::ParticleRenderer;
pub use sprite::ParticleSprite;
