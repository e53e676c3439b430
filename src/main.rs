use std::time::Instant;

use glclock::{AppError, abs::App, logging, render::ClockRenderer};
use glclock_core::{clock::HandAngles, config::ClockConfig, pacing::FramePacer};
use sdl2::{event::Event, keyboard::Keycode};

fn main() {
    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = ClockConfig::load()?;
    let mut app = App::new(&config.window)?;
    let gl = app.backend();

    gl.enable(glow::MULTISAMPLE);
    let (width, height) = app.drawable_size();
    gl.viewport(width as i32, height as i32);

    let renderer = ClockRenderer::new(&gl, &config)?;
    let pacer = FramePacer::new(config.frame_period());

    'running: loop {
        let frame_start = Instant::now();

        for event in app.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                _ => {}
            }
        }

        renderer.render(&HandAngles::now());
        app.window.gl_swap_window();

        pacer.wait(frame_start);
    }

    log::info!("Window closed");
    Ok(())
}
