//! Frame timing.
//!
//! One `FrameClock` per window; `tick()` once per presented frame. The resulting
//! `FrameTime::dt_ms()` is what the particle pool consumes.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
