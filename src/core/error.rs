//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Sink rejected a write; the bytes are not retried
    #[error("Sink '{sink}' failed to write {bytes} bytes: {source}")]
    SinkWrite {
        sink: String,
        bytes: usize,
        #[source]
        source: std::io::Error,
    },

    /// Sink failed to flush its own buffers
    #[error("Sink '{sink}' failed to flush: {source}")]
    SinkFlush {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },
}

impl LoggerError {
    /// Create a sink write error
    pub fn sink_write(sink: impl Into<String>, bytes: usize, source: std::io::Error) -> Self {
        LoggerError::SinkWrite {
            sink: sink.into(),
            bytes,
            source,
        }
    }

    /// Create a sink flush error
    pub fn sink_flush(sink: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::SinkFlush {
            sink: sink.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the output sink
    pub fn is_sink_error(&self) -> bool {
        matches!(
            self,
            LoggerError::SinkWrite { .. } | LoggerError::SinkFlush { .. }
        )
    }
}
