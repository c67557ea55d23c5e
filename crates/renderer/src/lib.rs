//! Rendering for the Mjolnir scene using wgpu.
//!
//! Lit meshes (ground, stones, the centerpiece) under a sun and a handful of point
//! lights, plus camera-facing billboards for orbiting particle groups.

pub mod camera;
pub mod mesh;
pub mod model;
pub mod pipeline;
pub mod renderer;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use mesh::*;
pub use model::*;
pub use pipeline::*;
pub use renderer::*;
pub use texture::*;
pub use vertex::*;
