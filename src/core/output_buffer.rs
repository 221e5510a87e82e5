//! Routing of formatted records to the sink
//!
//! With a zero threshold every record is written straight through. With a
//! positive threshold records accumulate under one mutex and are written in a
//! single sink call once the accumulated size reaches the threshold. The
//! append, the size check and the sink write form one critical section, so
//! batches reach the sink in the order their records were appended.
//!
//! A failed sink write is not retried. The bytes that were part of it are
//! discarded and the error goes back to whoever triggered the write.

use super::error::{LoggerError, Result};
use super::metrics::LoggerMetrics;
use super::sink::Sink;
use parking_lot::Mutex;
use std::sync::Arc;

/// Bytes accumulated since the last sink write
#[derive(Debug, Default)]
struct Pending {
    bytes: Vec<u8>,
    records: u64,
}

pub struct OutputBuffer {
    sink: Box<dyn Sink>,
    threshold: usize,
    pending: Mutex<Pending>,
    metrics: Arc<LoggerMetrics>,
}

impl OutputBuffer {
    /// Create a router; `threshold == 0` disables accumulation
    pub fn new(sink: Box<dyn Sink>, threshold: usize, metrics: Arc<LoggerMetrics>) -> Self {
        Self {
            sink,
            threshold,
            pending: Mutex::new(Pending {
                bytes: Vec::with_capacity(threshold),
                records: 0,
            }),
            metrics,
        }
    }

    #[inline]
    pub fn is_buffered(&self) -> bool {
        self.threshold > 0
    }

    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Bytes waiting for the next sink write
    pub fn pending_len(&self) -> usize {
        self.pending.lock().bytes.len()
    }

    /// Hand one complete record to the sink, directly or through the buffer
    pub fn write_record(&self, record: &[u8]) -> Result<()> {
        if !self.is_buffered() {
            return self.write_batch(record, 1);
        }

        let mut pending = self.pending.lock();
        pending.bytes.extend_from_slice(record);
        pending.records += 1;

        if pending.bytes.len() >= self.threshold {
            self.drain(&mut pending)
        } else {
            Ok(())
        }
    }

    /// Write out everything accumulated so far, then flush the sink itself
    pub fn flush(&self) -> Result<()> {
        self.metrics.record_flush();

        if self.is_buffered() {
            let mut pending = self.pending.lock();
            if !pending.bytes.is_empty() {
                self.drain(&mut pending)?;
            }
        }

        self.sink
            .flush()
            .map_err(|e| LoggerError::sink_flush(self.sink.name(), e))
    }

    fn drain(&self, pending: &mut Pending) -> Result<()> {
        let result = self.write_batch(&pending.bytes, pending.records);
        pending.bytes.clear();
        pending.records = 0;
        result
    }

    fn write_batch(&self, bytes: &[u8], records: u64) -> Result<()> {
        match self.sink.write(bytes) {
            Ok(()) => {
                self.metrics.record_written(records, bytes.len());
                Ok(())
            }
            Err(e) => {
                self.metrics.record_dropped(records);
                Err(LoggerError::sink_write(self.sink.name(), bytes.len(), e))
            }
        }
    }
}

impl Drop for OutputBuffer {
    fn drop(&mut self) {
        if !self.is_buffered() {
            return;
        }

        let pending = self.pending.get_mut();
        if pending.bytes.is_empty() {
            return;
        }

        let bytes = std::mem::take(&mut pending.bytes);
        let records = std::mem::take(&mut pending.records);
        if let Err(e) = self.write_batch(&bytes, records) {
            eprintln!(
                "[LOGGER ERROR] Failed to flush {} buffered records on shutdown: {}",
                records, e
            );
        }
    }
}
