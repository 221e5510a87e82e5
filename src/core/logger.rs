//! Main logger implementation

use super::{
    buffer_pool::{BufferPool, PoolStats},
    error::{LoggerError, Result},
    field::Field,
    log_context::{ContextBinding, ContextExtractor, ContextSupplier, LogContext},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    output_buffer::OutputBuffer,
    output_format::OutputFormat,
    sink::Sink,
};
use crate::sinks::ConsoleSink;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Sink failures between two stderr alerts
const ALERT_INTERVAL: u64 = 1000;

/// Construction options, everything except the sink
///
/// # Example
///
/// ```
/// use rust_structured_logger::{LoggerConfig, LogLevel, OutputFormat};
///
/// let config = LoggerConfig::from_json(
///     r#"{"min_level":"warn","format":"json","buffer_threshold":4096}"#,
/// ).unwrap();
///
/// assert_eq!(config.min_level, LogLevel::Warn);
/// assert_eq!(config.format, OutputFormat::Json);
/// assert!("{\"format\":\"xml\"}".parse::<LoggerConfig>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    /// Records below this level are discarded before any work is done
    pub min_level: LogLevel,
    pub format: OutputFormat,
    /// Accumulate this many bytes before writing to the sink; 0 writes each record
    pub buffer_threshold: usize,
    /// Context keys extracted in addition to `traceID` and `spanID`
    pub context_keys: Vec<String>,
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn extractor(&self) -> ContextExtractor {
        self.context_keys
            .iter()
            .fold(ContextExtractor::new(), |extractor, key| {
                extractor.with_key(key.clone())
            })
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            format: OutputFormat::Text,
            buffer_threshold: 0,
            context_keys: Vec::new(),
        }
    }
}

impl std::str::FromStr for LoggerConfig {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(s)
    }
}

/// State shared by a logger and every logger derived from it
struct LoggerCore {
    min_level: LogLevel,
    format: OutputFormat,
    output: OutputBuffer,
    pool: BufferPool,
    extractor: ContextExtractor,
    metrics: Arc<LoggerMetrics>,
    /// First sink error swallowed by an infallible call, reported by `flush`
    deferred_error: Mutex<Option<LoggerError>>,
    failed_calls: AtomicU64,
}

impl LoggerCore {
    /// Handle a sink failure on a call that cannot return it
    fn report_failure(&self, error: LoggerError) {
        let failures = self.failed_calls.fetch_add(1, Ordering::Relaxed);

        // Alert on first failure and periodically thereafter
        if failures == 0 || (failures + 1) % ALERT_INTERVAL == 0 {
            eprintln!(
                "[LOGGER WARNING] {} log calls failed to reach the sink, latest: {}",
                failures + 1,
                error
            );
        }

        let mut deferred = self.deferred_error.lock();
        if deferred.is_none() {
            *deferred = Some(error);
        }
    }
}

impl Drop for LoggerCore {
    fn drop(&mut self) {
        if let Err(e) = self.output.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped records (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Structured logger
///
/// Cloning is cheap and clones share configuration, sink, buffer pool and
/// output buffer. Derived loggers created with [`Logger::with_context`] or
/// [`Logger::with_static_context`] share the same state and only add context
/// fields to their records.
///
/// # Example
///
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder()
///     .format(OutputFormat::Json)
///     .sink(sink.clone())
///     .build();
///
/// logger.info("User authentication", &[
///     Field::new("userID", 12345),
///     Field::new("method", "oauth"),
///     Field::new("success", true),
/// ]);
///
/// assert_eq!(
///     sink.as_string(),
///     "{\"level\":\"INFO\",\"message\":\"User authentication\",\"userID\":12345,\"method\":\"oauth\",\"success\":true}\n"
/// );
/// ```
#[derive(Clone)]
pub struct Logger {
    core: Arc<LoggerCore>,
    context: ContextBinding,
}

impl Logger {
    /// Create a logger; construction cannot fail
    pub fn new(config: LoggerConfig, sink: impl Sink + 'static) -> Self {
        Self::from_parts(config, Box::new(sink))
    }

    fn from_parts(config: LoggerConfig, sink: Box<dyn Sink>) -> Self {
        let metrics = Arc::new(LoggerMetrics::new());
        let core = LoggerCore {
            min_level: config.min_level,
            format: config.format,
            output: OutputBuffer::new(sink, config.buffer_threshold, Arc::clone(&metrics)),
            pool: BufferPool::new(),
            extractor: config.extractor(),
            metrics,
            deferred_error: Mutex::new(None),
            failed_calls: AtomicU64::new(0),
        };

        Self {
            core: Arc::new(core),
            context: ContextBinding::None,
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_structured_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .format(OutputFormat::Json)
    ///     .sink(NullSink)
    ///     .buffer_threshold(4096)
    ///     .build();
    ///
    /// assert!(logger.is_enabled(LogLevel::Debug));
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    #[inline]
    pub fn min_level(&self) -> LogLevel {
        self.core.min_level
    }

    #[inline]
    pub fn format(&self) -> OutputFormat {
        self.core.format
    }

    #[inline]
    pub fn buffer_threshold(&self) -> usize {
        self.core.output.threshold()
    }

    pub fn sink_name(&self) -> &str {
        self.core.output.sink_name()
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.is_enabled(self.core.min_level)
    }

    /// Get the logger metrics for detailed observability
    ///
    /// Shared by every logger derived from the same root.
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.core.metrics
    }

    /// Whether this logger adds context fields to its records
    pub fn has_context(&self) -> bool {
        !self.context.is_none()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.core.pool.stats()
    }

    /// Format and route one record, returning any sink failure it triggers.
    ///
    /// A disabled level returns `Ok(())` before touching the buffer pool or
    /// the context supplier.
    pub fn try_log(&self, level: LogLevel, message: &str, fields: &[Field<'_>]) -> Result<()> {
        if !self.is_enabled(level) {
            return Ok(());
        }

        let core = &*self.core;
        let format = core.format;
        let mut buf = core.pool.acquire();

        format.begin_record(&mut buf, level, message);
        for field in fields {
            format.append_field(&mut buf, field);
        }
        self.context
            .visit(&core.extractor, |field| format.append_field(&mut buf, field));
        format.end_record(&mut buf);

        core.output.write_record(&buf)
    }

    /// Like [`Logger::try_log`], but a sink failure is counted, alerted on
    /// stderr and kept for the next [`Logger::flush`]
    #[inline]
    pub fn log(&self, level: LogLevel, message: &str, fields: &[Field<'_>]) {
        if let Err(e) = self.try_log(level, message, fields) {
            self.core.report_failure(e);
        }
    }

    #[inline]
    pub fn debug(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Debug, message, fields);
    }

    #[inline]
    pub fn info(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Info, message, fields);
    }

    #[inline]
    pub fn warn(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Warn, message, fields);
    }

    #[inline]
    pub fn error(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Error, message, fields);
    }

    /// Log at FATAL; the process keeps running
    #[inline]
    pub fn fatal(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Fatal, message, fields);
    }

    /// Log at PANIC; this does not panic
    #[inline]
    pub fn panic(&self, message: &str, fields: &[Field<'_>]) {
        self.log(LogLevel::Panic, message, fields);
    }

    /// Derive a logger that calls `supplier` on every enabled call and adds
    /// the recognized context keys it finds to the record.
    ///
    /// The derived logger replaces any binding this logger had.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_structured_logger::prelude::*;
    ///
    /// let sink = MemorySink::new();
    /// let logger = Logger::builder().sink(sink.clone()).build();
    ///
    /// let request = LogContext::new()
    ///     .with_field("traceID", "trace123")
    ///     .with_field("spanID", "span456");
    /// let request_logger = logger.with_context(move || request.clone());
    ///
    /// request_logger.info("Request processed", &[Field::new("status", 200)]);
    /// assert_eq!(
    ///     sink.as_string(),
    ///     "INFO Request processed status=200 traceID=trace123 spanID=span456\n"
    /// );
    /// ```
    #[must_use]
    pub fn with_context<F>(&self, supplier: F) -> Logger
    where
        F: Fn() -> LogContext + Send + Sync + 'static,
    {
        self.with_context_supplier(Some(Arc::new(supplier)))
    }

    /// Derive a logger from an optional supplier; `None` adds no context fields
    #[must_use]
    pub fn with_context_supplier(&self, supplier: Option<ContextSupplier>) -> Logger {
        Logger {
            core: Arc::clone(&self.core),
            context: supplier.map_or(ContextBinding::None, ContextBinding::Dynamic),
        }
    }

    /// Derive a logger whose context fields are extracted from `context` once,
    /// now, and reused for every record
    #[must_use]
    pub fn with_static_context(&self, context: &LogContext) -> Logger {
        Logger {
            core: Arc::clone(&self.core),
            context: ContextBinding::Static(self.core.extractor.snapshot(context)),
        }
    }

    /// Write out buffered records, then flush the sink.
    ///
    /// Returns the error of this write if it fails, otherwise the first sink
    /// error swallowed by an infallible logging call since the last flush.
    ///
    /// With a zero `buffer_threshold` there is nothing to write out and no
    /// record bytes reach the sink here, but the sink's own
    /// [`Sink::flush`] still runs, so a `WriterSink` over a `BufWriter` or
    /// stdout is drained as well.
    pub fn flush(&self) -> Result<()> {
        self.core.output.flush()?;

        match self.core.deferred_error.lock().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.core.min_level)
            .field("format", &self.core.format)
            .field("buffer_threshold", &self.core.output.threshold())
            .field("sink", &self.core.output.sink_name())
            .field("context", &self.context)
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Warn)
///     .format(OutputFormat::Json)
///     .sink(ConsoleSink::stderr())
///     .context_key("requestID")
///     .build();
///
/// assert!(!logger.is_enabled(LogLevel::Info));
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    sink: Option<Box<dyn Sink>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            sink: None,
        }
    }

    /// Replace every option with `config`
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the output sink; stdout is used when none is given
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Enable output buffering with the given byte threshold (0 disables it)
    #[must_use = "builder methods return a new value"]
    pub fn buffer_threshold(mut self, bytes: usize) -> Self {
        self.config.buffer_threshold = bytes;
        self
    }

    /// Extract an additional key from bound contexts
    #[must_use = "builder methods return a new value"]
    pub fn context_key(mut self, key: impl Into<String>) -> Self {
        self.config.context_keys.push(key.into());
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let sink = self
            .sink
            .unwrap_or_else(|| Box::new(ConsoleSink::stdout()));
        Logger::from_parts(self.config, sink)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use std::io;

    struct FailingSink;

    impl Sink for FailingSink {
        fn write(&self, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&self) -> io::Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn memory_logger(format: OutputFormat) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::builder().format(format).sink(sink.clone()).build();
        (logger, sink)
    }

    #[test]
    fn test_builder_defaults() {
        let logger = Logger::builder().sink(MemorySink::new()).build();
        assert_eq!(logger.min_level(), LogLevel::Info);
        assert_eq!(logger.format(), OutputFormat::Text);
        assert_eq!(logger.buffer_threshold(), 0);
        assert_eq!(logger.sink_name(), "memory");
    }

    #[test]
    fn test_default_logger_writes_to_stdout() {
        let logger = Logger::default();
        assert_eq!(logger.sink_name(), "stdout");
    }

    #[test]
    fn test_filtered_call_has_no_side_effects() {
        let (logger, sink) = memory_logger(OutputFormat::Text);
        logger.debug("hidden", &[Field::new("k", 1)]);

        assert!(sink.is_empty());
        assert_eq!(logger.pool_stats().acquired, 0);
        assert_eq!(logger.metrics().total_logged(), 0);
    }

    #[test]
    fn test_every_acquire_is_released() {
        let (logger, _sink) = memory_logger(OutputFormat::Json);
        for i in 0..10 {
            logger.info("tick", &[Field::new("i", i)]);
        }

        let stats = logger.pool_stats();
        assert_eq!(stats.acquired, 10);
        assert_eq!(stats.released, 10);
        assert_eq!(stats.allocated, 1);
    }

    #[test]
    fn test_supplier_not_called_for_filtered_calls() {
        use std::sync::atomic::AtomicUsize;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let (logger, _sink) = memory_logger(OutputFormat::Text);
        let derived = logger.with_context(move || {
            counter.fetch_add(1, Ordering::Relaxed);
            LogContext::new()
        });

        derived.debug("hidden", &[]);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
        derived.info("shown", &[]);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_parent_unaffected_by_derived() {
        let (logger, sink) = memory_logger(OutputFormat::Text);
        let ctx = LogContext::new().with_field("traceID", "t1");
        let derived = logger.with_static_context(&ctx);

        derived.info("child", &[]);
        logger.info("parent", &[]);

        assert_eq!(sink.as_string(), "INFO child traceID=t1\nINFO parent\n");
    }

    #[test]
    fn test_configured_context_keys() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .sink(sink.clone())
            .context_key("requestID")
            .build();
        let ctx = LogContext::new()
            .with_field("requestID", "req-9")
            .with_field("traceID", "t-9")
            .with_field("ignored", "x");

        logger.with_static_context(&ctx).warn("slow", &[]);
        assert_eq!(sink.as_string(), "WARN slow traceID=t-9 requestID=req-9\n");
    }

    #[test]
    fn test_try_log_returns_sink_error() {
        let logger = Logger::builder().sink(FailingSink).build();
        let err = logger.try_log(LogLevel::Error, "boom", &[]).unwrap_err();
        assert!(matches!(err, LoggerError::SinkWrite { .. }));
        assert_eq!(logger.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_infallible_call_defers_error_to_flush() {
        let logger = Logger::builder().sink(FailingSink).build();
        logger.info("first", &[]);
        logger.info("second", &[]);

        let err = logger.flush().unwrap_err();
        assert!(err.is_sink_error());
        assert_eq!(logger.metrics().dropped_count(), 2);

        // Reported once
        logger.flush().unwrap();
    }

    #[test]
    fn test_config_from_json() {
        let config = LoggerConfig::from_json(
            r#"{"min_level":"ERROR","format":"json","context_keys":["userID"]}"#,
        )
        .unwrap();
        assert_eq!(config.min_level, LogLevel::Error);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.buffer_threshold, 0);
        assert_eq!(config.context_keys, ["userID"]);
    }

    #[test]
    fn test_config_rejects_unknown_values() {
        assert!(LoggerConfig::from_json(r#"{"format":"yaml"}"#).is_err());
        assert!(LoggerConfig::from_json(r#"{"min_level":"LOUD"}"#).is_err());
        assert!(LoggerConfig::from_json(r#"{"colour":true}"#).is_err());
    }

    #[test]
    fn test_has_context() {
        let (logger, _sink) = memory_logger(OutputFormat::Text);
        assert!(!logger.has_context());
        assert!(logger.with_context(LogContext::new).has_context());
        assert!(logger.with_static_context(&LogContext::new()).has_context());
        assert!(!logger.with_context_supplier(None).has_context());
    }

    #[test]
    fn test_unbuffered_flush_reaches_sink_flush() {
        use std::sync::atomic::AtomicUsize;

        #[derive(Default)]
        struct CountingSink {
            writes: AtomicUsize,
            flushes: AtomicUsize,
        }

        impl Sink for CountingSink {
            fn write(&self, _bytes: &[u8]) -> io::Result<()> {
                self.writes.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }

            fn flush(&self) -> io::Result<()> {
                self.flushes.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }

            fn name(&self) -> &str {
                "counting"
            }
        }

        let sink = Arc::new(CountingSink::default());
        let logger = Logger::builder().sink(Arc::clone(&sink)).build();

        logger.flush().unwrap();
        assert_eq!(sink.writes.load(Ordering::Relaxed), 0);
        assert_eq!(sink.flushes.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_logger_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Logger>();
    }
}
