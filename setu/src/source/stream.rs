//! Blocking byte source over any `std::io::Read`
//!
//! The underlying reader is expected to return `TimedOut`/`WouldBlock` after a
//! short poll interval when no data is pending. Those are retried here so the
//! caller sees a plain blocking read, while the shutdown flag and the optional
//! stall timeout still get checked between polls.

use super::ByteSource;
use crate::error::{Error, Result};
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub struct StreamSource<R> {
    reader: R,
    name: String,
    running: Arc<AtomicBool>,
    read_timeout: Option<Duration>,
}

impl<R: Read> StreamSource<R> {
    /// Wrap a reader
    ///
    /// # Arguments
    /// * `reader` - Underlying stream (serial port, TCP socket, ...)
    /// * `name` - Label used in error messages
    /// * `running` - Shutdown flag; a pending read fails once it is cleared
    pub fn new(reader: R, name: impl Into<String>, running: Arc<AtomicBool>) -> Self {
        Self {
            reader,
            name: name.into(),
            running,
            read_timeout: None,
        }
    }

    /// Fail with [`Error::SourceStalled`] after this long without any byte
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        let mut idle_since = Instant::now();

        while filled < buf.len() {
            if !self.running.load(Ordering::Relaxed) {
                return Err(Error::Interrupted);
            }

            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(Error::SourceExhausted(format!(
                        "{}: end of stream",
                        self.name
                    )));
                }
                Ok(n) => {
                    filled += n;
                    idle_since = Instant::now();
                }
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    if let Some(limit) = self.read_timeout
                        && idle_since.elapsed() >= limit
                    {
                        return Err(Error::SourceStalled(limit));
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(Error::SourceExhausted(format!("{}: {}", self.name, e)));
                }
            }
        }

        Ok(filled)
    }
}
