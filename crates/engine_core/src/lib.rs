//! Core engine types shared by the Mjolnir scene crates.
//!
//! - Frame clock (`Time`) feeding delta/elapsed seconds to per-frame updates
//! - `Transform` for placing static scene nodes
//! - Smooth vertex normals for CPU-side meshes

pub mod geometry;
pub mod time;
pub mod transform;

pub use geometry::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
