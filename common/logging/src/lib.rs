use slog::{o, Drain, Level, Logger};
use sloggers::{
    null::NullLoggerBuilder,
    terminal::{Destination, TerminalLoggerBuilder},
    types, Build,
};
use std::str::FromStr;

/// Buffer size of the async drain. Records beyond this are dropped rather than blocking callers.
pub const ASYNC_CHANNEL_SIZE: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Parses a level name such as `info`, `debug` or `crit`.
pub fn parse_level(level: &str) -> Result<Level, String> {
    Level::from_str(level).map_err(|_| format!("unknown debug level: {}", level))
}

/// Builds the root logger, writing to stderr.
pub fn build_logger(level: Level, format: LogFormat) -> Result<Logger, String> {
    match format {
        LogFormat::Text => {
            let decorator = slog_term::TermDecorator::new().stderr().build();
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            let drain = slog_async::Async::new(drain)
                .chan_size(ASYNC_CHANNEL_SIZE)
                .build()
                .filter_level(level)
                .fuse();
            Ok(Logger::root(drain, o!()))
        }
        LogFormat::Json => TerminalLoggerBuilder::new()
            .level(severity(level))
            .destination(Destination::Stderr)
            .format(types::Format::Json)
            .channel_size(ASYNC_CHANNEL_SIZE)
            .build()
            .map_err(|e| format!("unable to build json logger: {}", e)),
    }
}

fn severity(level: Level) -> types::Severity {
    match level {
        Level::Critical => types::Severity::Critical,
        Level::Error => types::Severity::Error,
        Level::Warning => types::Severity::Warning,
        Level::Info => types::Severity::Info,
        Level::Debug => types::Severity::Debug,
        Level::Trace => types::Severity::Trace,
    }
}

/// Return a logger suitable for test usage.
///
/// By default no logs will be printed, but they can be enabled via
/// the `test_logger` feature.  This feature can be enabled for any
/// dependent crate by passing `--features logging/test_logger`, e.g.
/// ```bash
/// cargo test -p http_api --features logging/test_logger
/// ```
pub fn test_logger() -> Logger {
    if cfg!(feature = "test_logger") {
        TerminalLoggerBuilder::new()
            .level(types::Severity::Debug)
            .build()
            .expect("Should build test_logger")
    } else {
        NullLoggerBuilder
            .build()
            .expect("Should build null_logger")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_and_formats() {
        assert_eq!(parse_level("info"), Ok(Level::Info));
        assert_eq!(parse_level("crit"), Ok(Level::Critical));
        assert!(parse_level("loud").is_err());
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn builds_both_formats() {
        let log = build_logger(Level::Warning, LogFormat::Json).unwrap();
        slog::debug!(log, "Filtered out");

        build_logger(Level::Info, LogFormat::Text).unwrap();
    }
}
