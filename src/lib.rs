//! An analog clock drawn with OpenGL, and the small GPU toolkit it is built on.
//!
//! The GL-free pieces (camera, hand angles, configuration, OBJ import) live in `glclock_core`.
//! This crate adds everything that talks to the GPU.

pub mod abs;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;

pub use error::{AppError, ModelError};
