//! Error types of the client.

use glclock_core::CoreError;
use thiserror::Error;

/// Fatal start-up failures.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("SDL error: {0}")]
    Sdl(String),
    #[error("Window creation failed: {0}")]
    Window(#[from] sdl2::video::WindowBuildError),
    #[error("OpenGL context error: {0}")]
    GlContext(String),
    #[error("OpenGL function loader returned no entry point for {0}")]
    GlLoader(&'static str),
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to import model: {0}")]
    Import(#[from] CoreError),
}
