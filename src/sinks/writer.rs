//! Sinks over arbitrary writers

use crate::core::Sink;
use parking_lot::Mutex;
use std::io::{self, Write};

/// Adapts any `Write` into a sink by serializing access through a mutex
///
/// ```
/// use rust_structured_logger::prelude::*;
/// use rust_structured_logger::sinks::WriterSink;
/// use std::io::BufWriter;
///
/// let sink = WriterSink::new(BufWriter::new(std::io::sink()));
/// let logger = Logger::builder().sink(sink).build();
/// logger.info("ready", &[]);
/// logger.flush().unwrap();
/// ```
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
    name: String,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self::named(writer, "writer")
    }

    pub fn named(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer: Mutex::new(writer),
            name: name.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        self.writer.lock().write_all(bytes)
    }

    fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl Sink for NullSink {
    fn write(&self, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
