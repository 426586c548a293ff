//! Logging setup for the intake binary
//!
//! `RUST_LOG` wins over the configured level. With a log directory, output
//! goes to a daily rolling `sr-intake.<date>` file instead of stderr.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter for `level`, unless `RUST_LOG` is set
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when logging to a file; keep it alive
/// until exit or buffered lines are lost.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level.unwrap_or("info")))
        .with_target(false);

    match log_dir.map(Path::new).filter(|dir| dir.is_dir()) {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "sr-intake"));
            builder.with_writer(writer).with_ansi(false).init();
            Some(guard)
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            None
        }
    }
}
