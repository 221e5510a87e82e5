//! Logging macros for structured fields.
//!
//! Each macro takes a logger, a message and any number of `key => value`
//! pairs. The pairs become a stack array of [`Field`](crate::Field)s, so a
//! call allocates nothing on the heap beyond what the logger itself does.
//!
//! # Examples
//!
//! ```
//! use rust_structured_logger::prelude::*;
//! use rust_structured_logger::{info, warn};
//!
//! let logger = Logger::builder().sink(NullSink).build();
//!
//! // Message only
//! info!(logger, "Server started");
//!
//! // With fields
//! let port = 8080;
//! info!(logger, "Server listening", "port" => port, "tls" => true);
//! warn!(logger, "Retrying", "attempt" => 3, "of" => 5);
//! ```

/// Log a message at the given level.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().sink(NullSink).build();
/// use rust_structured_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Request failed", "status" => 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $logger.log($level, $msg, &[$($crate::Field::new($key, $value)),*])
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().sink(NullSink).min_level(LogLevel::Debug).build();
/// use rust_structured_logger::debug;
/// debug!(logger, "Cache lookup", "hit" => false);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().sink(NullSink).build();
/// use rust_structured_logger::info;
/// info!(logger, "Processing items", "count" => 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().sink(NullSink).build();
/// use rust_structured_logger::error;
/// error!(logger, "Failed to connect to database", "retries" => 3, "host" => "db-1");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message. The process is not terminated.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Log a panic-level message. Nothing panics.
#[macro_export]
macro_rules! panic_log {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Panic, $($arg)+)
    };
}
