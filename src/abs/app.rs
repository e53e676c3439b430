//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2 window and the OpenGL
//! context the clock draws into.

use std::sync::Arc;

use glclock_core::config::WindowConfig;

use crate::{abs::Backend, error::AppError};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Opens a fixed-size window with an OpenGL 3.3 core context, multisampled when
    /// `config.samples` is non-zero.
    pub fn new(config: &WindowConfig) -> Result<Self, AppError> {
        let sdl = sdl2::init().map_err(AppError::Sdl)?;
        let video_subsystem = sdl.video().map_err(AppError::Sdl)?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        if config.samples > 0 {
            gl_attr.set_multisample_buffers(1);
            gl_attr.set_multisample_samples(config.samples);
        }

        let window = video_subsystem
            .window(&config.title, config.width, config.height)
            .opengl()
            .position_centered()
            .build()?;

        let gl_context = window.gl_create_context().map_err(AppError::GlContext)?;
        window
            .gl_make_current(&gl_context)
            .map_err(AppError::GlContext)?;

        if video_subsystem.gl_get_proc_address("glClear").is_null() {
            return Err(AppError::GlLoader("glClear"));
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(AppError::Sdl)?;

        log::info!(
            "Opened {}x{} window \"{}\" ({} samples)",
            config.width,
            config.height,
            config.title,
            config.samples
        );

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl: Arc::new(gl),
            event_pump,
        })
    }

    /// The context as a [`Backend`] for the GPU wrappers.
    pub fn backend(&self) -> Arc<dyn Backend> {
        self.gl.clone()
    }

    /// The drawable size of the window in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }
}
