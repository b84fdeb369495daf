//! In-memory sink for testing

use super::DatagramSink;
use crate::error::{Error, Result};
use std::io;

/// Keeps every payload it is given
///
/// Can be told to fail the next N sends to exercise error handling.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Vec<Vec<u8>>,
    fail_next: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` sends with a socket-layer error
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }

    /// Payloads delivered so far, oldest first
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub fn into_sent(self) -> Vec<Vec<u8>> {
        self.sent
    }
}

impl DatagramSink for RecordingSink {
    fn send(&mut self, payload: &[u8]) -> Result<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(Error::Send(io::Error::new(
                io::ErrorKind::NetworkUnreachable,
                "network unreachable",
            )));
        }
        self.sent.push(payload.to_vec());
        Ok(())
    }
}
