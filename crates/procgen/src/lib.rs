//! Procedural scene content: sandy ground, stones, and where the stones go.
//!
//! All generators are seeded; the same seed always produces the same scene.

pub mod ground;
pub mod rock;
pub mod scatter;
pub mod surface;

pub use ground::*;
pub use rock::*;
pub use scatter::*;
pub use surface::*;
