use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Logging capability. Custom sinks implement this single method; the SDK
/// never logs through anything else.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Built-in logger forwarding to the `log` facade, filtered by a minimum
/// level so hosts without a configured facade subscriber stay quiet.
pub struct DefaultLogger {
    min_level: LogLevel,
}

impl DefaultLogger {
    pub fn new(min_level: LogLevel) -> DefaultLogger {
        DefaultLogger { min_level }
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        DefaultLogger::new(LogLevel::Error)
    }
}

impl Logger for DefaultLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }
        match level {
            LogLevel::Debug => log::debug!("{}", message),
            LogLevel::Info => log::info!("{}", message),
            LogLevel::Warning => log::warn!("{}", message),
            LogLevel::Error => log::error!("{}", message),
        }
    }
}

/// Formats a message the way every module logs it: the originating file
/// followed by the message body.
pub(crate) fn log_message(logger: &dyn Logger, level: LogLevel, file: &str, message: &str) {
    logger.log(level, &format!("{} : {}", file, message));
}
