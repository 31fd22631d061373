//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Targets which log on every simulation tick or queued event, with the most verbose level they
/// are allowed to reach.
const NOISY_TARGETS: [(&str, LevelFilter); 3] = [
    ("explore_lib::sim_world", LevelFilter::Debug),
    ("explore_lib::sim_client", LevelFilter::Debug),
    ("explore_lib::event_queue", LevelFilter::Debug),
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Records are written to stdout and to the session's log file.
///
/// # Notes
///
/// - `min_level` must be at least `log::Level::Info`, so that state changes
///   of the controller always reach the session log.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter,
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(session.log_file_path.clone()).map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new()
        .format(format_record)
        .level(min_level);

    for (target, level) in target_levels(min_level) {
        dispatch = dispatch.level_for(target, level);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Per-target levels for the given minimum level, noisy targets are capped.
fn target_levels(min_level: LevelFilter) -> impl Iterator<Item = (&'static str, LevelFilter)> {
    NOISY_TARGETS
        .iter()
        .map(move |(target, cap)| (*target, min_level.min(*cap)))
}

/// Format a record as `[elapsed LVL] message`, adding the target for debug and trace records.
fn format_record(out: fern::FormatCallback, message: &std::fmt::Arguments, record: &log::Record) {
    let elapsed_s = session::get_elapsed_seconds();
    let level = level_to_str(record.level());

    match record.level() > log::Level::Info {
        true => out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            elapsed_s,
            level,
            record.target(),
            message
        )),
        false => out.finish(format_args!("[{:10.6} {}] {}", elapsed_s, level, message)),
    }
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}
