//! WebGPU rendering module
//!
//! Draws a top-down tactical map of the arena: `scene` turns the world into
//! flat-colored triangles and `pipeline` uploads and presents them.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState};
