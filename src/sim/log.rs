use std::fs::{File, OpenOptions};
use std::io::{self, Write};

#[derive(PartialEq, PartialOrd, Debug, Default, Clone, Copy)]
pub enum LogLevel {
    #[default]
    NONE,
    INFO,
    DEBUG,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::NONE => "NONE",
            LogLevel::INFO => "INFO",
            LogLevel::DEBUG => "DEBUG",
        }
    }
}

pub fn to_loglevel(ulevel: u64) -> LogLevel {
    match ulevel {
        0 => LogLevel::NONE,
        1 => LogLevel::INFO,
        _ => LogLevel::DEBUG,
    }
}

/// Trace of simulated accesses, separate from the `log` facade so it can be
/// sent to its own file without touching the interactive output.
pub struct Logger {
    level: LogLevel,
    sink: Box<dyn Write>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").field("level", &self.level).finish()
    }
}

impl Logger {
    /// Append to `path`, or write to stderr when no path is given.
    pub fn new(ulevel: u64, path: Option<&str>) -> io::Result<Self> {
        let level = to_loglevel(ulevel);
        let sink: Box<dyn Write> = match path {
            Some(path) if level > LogLevel::NONE => {
                let file: File = OpenOptions::new().create(true).append(true).open(path)?;
                Box::new(file)
            }
            _ => Box::new(io::stderr()),
        };
        Ok(Logger { level, sink })
    }

    pub fn silent() -> Self {
        Logger {
            level: LogLevel::NONE,
            sink: Box::new(io::sink()),
        }
    }

    pub fn with_sink(level: LogLevel, sink: Box<dyn Write>) -> Self {
        Logger { level, sink }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::NONE && level <= self.level
    }

    pub fn log(&mut self, level: LogLevel, args: std::fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        // stop tracing once the sink fails
        if writeln!(self.sink, "[{}] {}", level.as_str(), args).is_err() {
            self.level = LogLevel::NONE;
        }
    }
}

#[macro_export]
macro_rules! trace_log {
    // usage: trace_log!(logger, LogLevel::INFO, "a {} event", "read")
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        $logger.log($level, format_args!($($arg)+));
    }};
}
#[macro_export]
macro_rules! trace_info {
    ($logger:expr, $($arg:tt)+) => ( $crate::trace_log!($logger, $crate::sim::log::LogLevel::INFO, $($arg)+); )
}
#[macro_export]
macro_rules! trace_debug {
    ($logger:expr, $($arg:tt)+) => ( $crate::trace_log!($logger, $crate::sim::log::LogLevel::DEBUG, $($arg)+); )
}
