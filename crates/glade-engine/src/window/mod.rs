//! Window + event loop.
//!
//! Owns the `winit` event loop and the single scene window, and wires them to the
//! GPU layer and the `core::App` implementation.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
