//! Contract between the window runtime and applications.
//!
//! The runtime calls into an `App` with an explicit `FrameCtx` each frame; apps keep
//! their own state (particle systems, renderers, camera) and never see runtime
//! internals.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
