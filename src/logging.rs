//! Logger setup.

/// Installs the global logger, writing `[HH:MM:SS.mmm LEVEL target] message` lines to stderr.
///
/// Everything logs at `Info` and above; this crate and `glclock_core` log at `Debug` in debug
/// builds.
pub fn init() -> Result<(), log::SetLoggerError> {
    let own_level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .level_for("glclock", own_level)
        .level_for("glclock_core", own_level)
        .chain(std::io::stderr())
        .apply()
}
