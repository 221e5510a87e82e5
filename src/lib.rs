//! # Rust Structured Logger
//!
//! A low-allocation structured logging engine: typed key/value fields,
//! text and JSON wire formats, pooled formatting buffers, optional output
//! buffering, and automatic extraction of correlation fields (`traceID`,
//! `spanID`, custom keys) from an ambient context.
//!
//! ## Features
//!
//! - **Two formats**: `LEVEL message k=v` text and flat single-line JSON
//! - **Pooled buffers**: enabled calls reuse formatting buffers; filtered
//!   calls return before any work is done
//! - **Output buffering**: coalesce records into one sink write per threshold
//! - **Context-aware**: derived loggers add context fields to every record
//! - **Thread safe**: `Logger` is `Send + Sync` and cheap to clone
//!
//! ## Example
//!
//! ```
//! use rust_structured_logger::prelude::*;
//! use rust_structured_logger::info;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder()
//!     .format(OutputFormat::Json)
//!     .sink(sink.clone())
//!     .build();
//!
//! info!(logger, "Application started", "port" => 8080);
//! assert_eq!(
//!     sink.as_string(),
//!     "{\"level\":\"INFO\",\"message\":\"Application started\",\"port\":8080}\n"
//! );
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        ContextExtractor, ContextSupplier, Field, FieldValue, LogContext, LogLevel, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, OutputFormat, Result, Sink,
        Value,
    };
    pub use crate::sinks::{ConsoleSink, FileSink, MemorySink, NullSink, WriterSink};
}

pub use crate::core::{
    BufferPool, ContextBinding, ContextExtractor, ContextField, ContextSupplier, Field,
    FieldValue, LogContext, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, OutputFormat, PoolStats, Result, Sink, Value, SPAN_ID_KEY, TRACE_ID_KEY,
};
pub use sinks::{ConsoleSink, FileSink, MemorySink, NullSink, WriterSink};
