//! File sink implementation

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Appends records to a file
///
/// Writes go straight to the file without an extra userspace buffer; batch
/// them with the logger's output buffering instead. With the `file` feature,
/// [`FileSink::with_lock`] takes an advisory exclusive lock around every
/// write so several processes can share one log file.
pub struct FileSink {
    file: Mutex<File>,
    path: PathBuf,
    #[cfg(feature = "file")]
    lock: bool,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            file: Mutex::new(file),
            path,
            #[cfg(feature = "file")]
            lock: false,
        })
    }

    /// Hold an advisory exclusive lock on the file during each write
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_structured_logger::sinks::FileSink;
    ///
    /// let sink = FileSink::new("/var/log/app.log")
    ///     .unwrap()
    ///     .with_lock(true);
    /// ```
    #[cfg(feature = "file")]
    #[must_use]
    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(feature = "file")]
    fn write_locked(&self, file: &mut File, bytes: &[u8]) -> io::Result<()> {
        use fs2::FileExt;

        if !self.lock {
            return file.write_all(bytes);
        }

        file.lock_exclusive()?;
        let result = file.write_all(bytes);
        let unlocked = file.unlock();
        result.and(unlocked)
    }

    #[cfg(not(feature = "file"))]
    fn write_locked(&self, file: &mut File, bytes: &[u8]) -> io::Result<()> {
        file.write_all(bytes)
    }
}

impl Sink for FileSink {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut file = self.file.lock();
        self.write_locked(&mut file, bytes)
    }

    fn flush(&self) -> io::Result<()> {
        self.file.lock().flush()
    }

    fn name(&self) -> &str {
        "file"
    }
}
