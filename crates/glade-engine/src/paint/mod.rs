//! Color types shared by the particle core and the renderers.
//!
//! Colors are straight alpha in `[0, 1]`. The particle pass blends additively,
//! so no premultiplication step is needed before upload.

mod color;

pub use color::{Color, Rgb};
