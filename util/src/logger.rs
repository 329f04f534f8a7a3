//! # Logger
//!
//! Log output for the autonomy executables. Every record goes both to stdout and to the session's
//! log file, stamped with the seconds elapsed since the session started so that a log can be
//! lined up against the control cycles which produced it.
//!
//! Records from the per-cycle modules (pursuit, event dispatch) are verbose at `Debug`, so those
//! targets are capped at `Info` on stdout while the file keeps everything.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info, Level};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Targets which log every cycle at `Debug` and are kept out of the console below `Info`.
const CYCLE_TARGETS: [&str; 2] = ["auton_lib::auto::traj_ctrl", "auton_lib::auto::events"];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The log level must let at least `INFO` through, found `{0}`")]
    LevelTooHigh(LevelFilter),

    #[error("Could not open the session log file: {0}")]
    LogFile(std::io::Error),

    #[error("A logger has already been installed: {0}")]
    AlreadySet(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the logger for this session, writing to stdout and to the session's log file.
///
/// Only the first call in a process succeeds, later calls return
/// [`LoggerInitError::AlreadySet`].
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::LevelTooHigh(min_level));
    }

    let log_file =
        fern::log_file(session.log_file_path.clone()).map_err(LoggerInitError::LogFile)?;

    let mut console = fern::Dispatch::new().chain(std::io::stdout());
    for target in CYCLE_TARGETS.iter() {
        console = console.level_for(*target, min_level.min(LevelFilter::Info));
    }

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_record(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message
                )
            ))
        })
        .level(min_level)
        .chain(console)
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::AlreadySet)?;

    info!("Logging initialised at {:?}", min_level);
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log file: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a single log line. The target is only shown below `Info`.
fn format_record(
    elapsed_s: f64,
    level: Level,
    target: &str,
    message: &std::fmt::Arguments,
) -> String {
    if level > Level::Info {
        format!(
            "[{:10.3} {}] {}: {}",
            elapsed_s,
            level_tag(level),
            target,
            message
        )
    } else {
        format!("[{:10.3} {}] {}", elapsed_s, level_tag(level), message)
    }
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_record() {
        colored::control::set_override(false);

        assert_eq!(
            format_record(1.5, Level::Info, "auton_exec", &format_args!("Routine stage {}", 2)),
            "[     1.500 INF] Routine stage 2"
        );
        assert_eq!(
            format_record(
                0.0,
                Level::Debug,
                "auton_lib::auto::events",
                &format_args!("fired")
            ),
            "[     0.000 DBG] auton_lib::auto::events: fired"
        );
    }
}
