//! Forwarding loop: byte source -> synchronizer -> datagram sink
//!
//! One thread, fully blocking:
//!
//! ```text
//! loop {
//!     frame = synchronizer.next_frame()?   // blocks, re-syncs as needed
//!     sink.send(frame)                     // fire-and-forget
//! }
//! ```
//!
//! Source errors always end the loop. Send errors end it too under
//! [`SendErrorPolicy::Fatal`]; under [`SendErrorPolicy::Log`] the frame is
//! dropped and counted.

use crate::broadcast::DatagramSink;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::source::ByteSource;
use crate::sync::{FrameSynchronizer, SyncStats};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// What to do when the sink rejects a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendErrorPolicy {
    /// Stop the bridge and report the error
    #[default]
    Fatal,
    /// Log a warning, drop the frame and keep going
    Log,
}

/// Counters for one bridge run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Frames handed to the sink successfully
    pub frames_forwarded: u64,
    /// Sends that failed and were tolerated
    pub send_failures: u64,
    /// Forwarded frames whose XOR checksum did not match
    pub checksum_mismatches: u64,
    /// Synchronizer counters
    pub sync: SyncStats,
}

/// Serial-to-datagram bridge
pub struct Bridge<S, D> {
    sync: FrameSynchronizer<S>,
    sink: D,
    send_policy: SendErrorPolicy,
    stats: BridgeStats,
}

impl<S: ByteSource, D: DatagramSink> Bridge<S, D> {
    pub fn new(sync: FrameSynchronizer<S>, sink: D) -> Self {
        Self {
            sync,
            sink,
            send_policy: SendErrorPolicy::default(),
            stats: BridgeStats::default(),
        }
    }

    pub fn with_send_policy(mut self, policy: SendErrorPolicy) -> Self {
        self.send_policy = policy;
        self
    }

    /// Read one frame and forward it
    ///
    /// Returns the frame that was read, whether or not a tolerated send
    /// failure dropped it.
    pub fn step(&mut self) -> Result<Frame> {
        let frame = self.sync.next_frame()?;

        if !frame.checksum_ok() {
            self.stats.checksum_mismatches += 1;
            log::debug!(
                "Checksum mismatch (stored {:#04x}, computed {:#04x}): {}",
                frame.checksum(),
                frame.computed_checksum(),
                frame
            );
        }

        let id = frame.id();
        log::trace!(
            "Frame SRC=0x{:02X} DST=0x{:02X} CMD=0x{:02X}: {}",
            id.src,
            id.dst,
            id.cmd,
            frame
        );

        match self.sink.send(frame.as_bytes()) {
            Ok(()) => self.stats.frames_forwarded += 1,
            Err(e) => match self.send_policy {
                SendErrorPolicy::Fatal => return Err(e),
                SendErrorPolicy::Log => {
                    self.stats.send_failures += 1;
                    log::warn!("Dropped frame, send failed: {}", e);
                }
            },
        }

        Ok(frame)
    }

    /// Forward frames until `running` is cleared or a fatal error occurs
    ///
    /// A source interrupted by shutdown counts as a clean stop. The run
    /// summary is logged either way.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        log::info!(
            "Bridge started (marker policy: {:?}, send errors: {:?})",
            self.sync.policy(),
            self.send_policy
        );

        let result = loop {
            if !running.load(Ordering::Relaxed) {
                break Ok(());
            }
            match self.step() {
                Ok(_) => {}
                Err(Error::Interrupted) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.log_summary();
        result
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            sync: self.sync.stats(),
            ..self.stats
        }
    }

    pub fn synchronizer(&self) -> &FrameSynchronizer<S> {
        &self.sync
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn into_parts(self) -> (FrameSynchronizer<S>, D) {
        (self.sync, self.sink)
    }

    fn log_summary(&self) {
        let stats = self.stats();
        log::info!(
            "Bridge stopped: {} frame(s) forwarded, {} send failure(s), {} checksum mismatch(es)",
            stats.frames_forwarded,
            stats.send_failures,
            stats.checksum_mismatches
        );
        log::info!(
            "Re-sync: {} event(s), {} byte(s) discarded, {} loose accept(s)",
            stats.sync.resyncs,
            stats.sync.discarded_bytes,
            stats.sync.loose_accepts
        );
    }
}
