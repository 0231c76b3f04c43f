use std::fs;
use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    fmt,
    prelude::*,
    EnvFilter,
};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "gts_monitor.log";

/// Initializes the logging system with both console and file output.
///
/// Console output goes to stderr so that `list`/`regions` JSON on stdout stays
/// machine-readable.
pub fn init_logging() {
    let _ = fs::create_dir_all(LOG_DIR);

    // Daily rotation, written off the hot path
    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stderr);

    let default_directive: Directive = match "gts_monitor=info".parse() {
        Ok(directive) => directive,
        Err(_) => LevelFilter::INFO.into(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(default_directive))
        .with(file_layer)
        .with(console_layer)
        .init();

    // The guard must outlive main so buffered lines are flushed
    std::mem::forget(guard);
}
