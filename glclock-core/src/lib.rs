//! The GL-free core of glclock. This crate holds everything that does not need
//! a graphics context: the fly camera, clock hand arithmetic, colors, frame
//! pacing, configuration and the importer-neutral scene graph used by the model
//! loader.

pub mod camera;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod pacing;
pub mod scene;
pub mod vertex;

pub use error::CoreError;
