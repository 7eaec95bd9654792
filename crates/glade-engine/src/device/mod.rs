//! wgpu device and surface ownership.
//!
//! `Gpu` creates the instance/adapter/device/queue for one window, keeps the
//! surface configured across resizes, and hands out per-frame encoders.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceAction;
