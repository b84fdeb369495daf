//! Mock byte source for testing

use super::ByteSource;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory byte source
///
/// Serves injected bytes in order and reports [`Error::SourceExhausted`] once
/// a request cannot be satisfied in full. Clones share the same buffer, so a
/// test can keep a handle after moving one into the synchronizer.
#[derive(Clone, Default)]
pub struct MockSource {
    inner: Arc<Mutex<MockSourceInner>>,
}

#[derive(Default)]
struct MockSourceInner {
    read_buffer: VecDeque<u8>,
    consumed: usize,
    short_reads: bool,
}

impl MockSource {
    /// Create a new empty mock source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source preloaded with `data`
    pub fn from_bytes(data: &[u8]) -> Self {
        let source = Self::new();
        source.inject(data);
        source
    }

    fn lock(&self) -> MutexGuard<'_, MockSourceInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Inject data to be read
    pub fn inject(&self, data: &[u8]) {
        self.lock().read_buffer.extend(data);
    }

    /// Bytes still waiting to be read
    pub fn remaining(&self) -> usize {
        self.lock().read_buffer.len()
    }

    /// Bytes handed out so far
    pub fn consumed(&self) -> usize {
        self.lock().consumed
    }

    /// Deliver one byte less than requested on every read
    ///
    /// Simulates a source that breaks the fill-completely contract.
    pub fn set_short_reads(&self, enabled: bool) {
        self.lock().short_reads = enabled;
    }
}

impl ByteSource for MockSource {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut inner = self.lock();
        let want = if inner.short_reads {
            buf.len().saturating_sub(1)
        } else {
            buf.len()
        };

        if inner.read_buffer.len() < want {
            return Err(Error::SourceExhausted(format!(
                "mock: {} byte(s) requested, {} available",
                want,
                inner.read_buffer.len()
            )));
        }

        for slot in buf.iter_mut().take(want) {
            if let Some(b) = inner.read_buffer.pop_front() {
                *slot = b;
            }
        }
        inner.consumed += want;

        Ok(want)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serves_bytes_in_order() {
        let mut source = MockSource::from_bytes(&[1, 2, 3, 4]);

        let mut buf = [0u8; 3];
        assert_eq!(source.fill(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.consumed(), 3);
    }

    #[test]
    fn test_insufficient_data_is_exhaustion() {
        let mut source = MockSource::from_bytes(&[1, 2]);
        let mut buf = [0u8; 3];

        assert!(matches!(
            source.fill(&mut buf),
            Err(Error::SourceExhausted(_))
        ));
    }

    #[test]
    fn test_clones_share_buffer() {
        let handle = MockSource::new();
        let mut source = handle.clone();
        handle.inject(&[9]);

        let mut buf = [0u8; 1];
        source.fill(&mut buf).unwrap();
        assert_eq!(buf, [9]);
        assert_eq!(handle.remaining(), 0);
    }

    #[test]
    fn test_short_reads() {
        let mut source = MockSource::from_bytes(&[1, 2, 3]);
        source.set_short_reads(true);

        let mut buf = [0u8; 3];
        assert_eq!(source.fill(&mut buf).unwrap(), 2);
        assert_eq!(source.remaining(), 1);
    }
}
