//! Tracing subscriber setup shared by the test drivers.

use crate::config::LogLevel;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `verbose` forces `DEBUG`, otherwise the configured level applies.
/// `RUST_LOG` directives are honoured on top of that. Logs go to stderr so
/// they never interleave with the drivers' stdout reports.
pub fn init(level: LogLevel, verbose: bool, json: bool) {
    let level = effective_level(level, verbose);
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Level selected from config and the `--verbose` flag.
pub fn effective_level(level: LogLevel, verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        level.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_overrides_config() {
        assert_eq!(effective_level(LogLevel::Error, true), Level::DEBUG);
        assert_eq!(effective_level(LogLevel::Warn, false), Level::WARN);
    }
}
