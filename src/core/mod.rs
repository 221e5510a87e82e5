//! Core logger types and traits

pub mod buffer_pool;
pub mod encoder;
pub mod error;
pub mod field;
pub mod log_context;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_buffer;
pub mod output_format;
pub mod sink;

pub use buffer_pool::{BufferPool, PoolStats, PooledBuffer};
pub use error::{LoggerError, Result};
pub use field::{Field, Value};
pub use log_context::{
    ContextBinding, ContextExtractor, ContextField, ContextSupplier, FieldValue, LogContext,
    SPAN_ID_KEY, TRACE_ID_KEY,
};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerConfig};
pub use metrics::LoggerMetrics;
pub use output_buffer::OutputBuffer;
pub use output_format::OutputFormat;
pub use sink::Sink;
