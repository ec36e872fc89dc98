//! Log output for scripts. Standard output belongs to the response, so every
//! record goes to standard error, one line each.

use std::io::Write;

use log::{Level, Log, Metadata, Record};

/// Set to a non-empty value to get debug records.
pub const DEBUG_VAR: &str = "CGI_DEMOS_DEBUG";

pub struct StderrLogger {
    level: Level,
}

impl StderrLogger {
    pub fn new(level: Level) -> StderrLogger {
        StderrLogger { level }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let stderr = std::io::stderr();
            let mut stderr = stderr.lock();
            // Nowhere left to report a failure to.
            let _ = writeln!(stderr, "{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Installs the stderr logger. Calling this again does nothing.
pub fn init() {
    let level = match std::env::var_os(DEBUG_VAR) {
        Some(x) if !x.is_empty() => Level::Debug,
        _ => Level::Warn,
    };
    if log::set_boxed_logger(Box::new(StderrLogger::new(level))).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_filtering() {
        let logger = StderrLogger::new(Level::Warn);
        let warn = Metadata::builder().level(Level::Warn).build();
        let error = Metadata::builder().level(Level::Error).build();
        let debug = Metadata::builder().level(Level::Debug).build();
        assert!(logger.enabled(&warn));
        assert!(logger.enabled(&error));
        assert!(!logger.enabled(&debug));
    }

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
        log::warn!("logging from a test");
    }
}
