//! Per-frame scene effects: orbiting particle groups and flickering lights.
//!
//! Everything here is plain owned state plus explicit update calls. Randomness is
//! always injected as a `rand::Rng`, so the same seed reproduces the same scene and
//! none of it needs a GPU to test.

pub mod color;
pub mod flicker;
pub mod orbit;
pub mod range;
pub mod updater;

pub use color::*;
pub use flicker::*;
pub use orbit::*;
pub use range::*;
pub use updater::*;
