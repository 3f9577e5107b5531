//! WebGPU rendering module
//!
//! The scene is flat-colored triangle geometry built on the CPU each frame
//! in play-field pixels and mapped to NDC on upload.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState};
pub use vertex::Vertex;
