//! This module contains the GPU-facing building blocks of the clock: the backend seam, owned GPU
//! handles, shader programs, textures and meshes, plus the application window.

pub mod app;
pub mod backend;
pub mod handle;
pub mod mesh;
pub mod shader;
pub mod texture;

#[cfg(test)]
pub mod recording;

pub use app::*;
pub use backend::*;
pub use handle::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
