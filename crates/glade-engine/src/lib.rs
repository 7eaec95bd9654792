//! Glade engine crate.
//!
//! The particle simulation (`particles`) is self-contained and GPU-free. The
//! remaining modules are the host it runs in: frame timing, logging, a wgpu device
//! per window, the winit runtime, and the particle renderer.

pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod particles;
pub mod render;
pub mod time;
pub mod window;
