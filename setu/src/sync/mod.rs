//! Frame synchronizer
//!
//! Turns an unstructured byte stream into a sequence of [`FRAME_SIZE`]-byte
//! frames. The stream carries no length prefix and no escaping, only the
//! two marker bytes, so alignment is recovered by sliding:
//!
//! ```text
//!  stream:  FF FF 32 00 00 .. 00 34 32 ..
//!           └──── window ────┘              misaligned: drop FF, read 1
//!              └──── window ────┘           misaligned: drop FF, read 1
//!                 └──── window ────┘        aligned -> frame, discarded = 2
//! ```
//!
//! # Marker policy
//!
//! By default sliding continues only while *both* markers are wrong, so a
//! window with one correct marker is accepted as aligned. That is
//! [`MarkerPolicy::Loose`]. [`MarkerPolicy::Strict`] keeps
//! sliding until both markers match. Loose accepts with a misplaced marker
//! are counted in [`SyncStats::loose_accepts`].
//!
//! Each call owns a fresh window; nothing but the statistics carries over
//! between calls.

pub mod window;

pub use window::SlidingWindow;

use crate::error::{Error, Result};
use crate::frame::{END_MARKER, FRAME_SIZE, Frame, START_MARKER};
use crate::source::ByteSource;
use serde::{Deserialize, Serialize};

/// When a window counts as aligned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerPolicy {
    /// Aligned if either marker is in place
    #[default]
    Loose,
    /// Aligned only if both markers are in place
    Strict,
}

impl MarkerPolicy {
    #[inline]
    pub fn is_aligned(self, first: u8, last: u8) -> bool {
        match self {
            MarkerPolicy::Loose => first == START_MARKER || last == END_MARKER,
            MarkerPolicy::Strict => first == START_MARKER && last == END_MARKER,
        }
    }
}

/// Running counters across all `next_frame` calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Frames returned
    pub frames: u64,
    /// Bytes dropped while re-synchronizing
    pub discarded_bytes: u64,
    /// Calls that had to discard at least one byte
    pub resyncs: u64,
    /// Frames accepted by the loose policy with one marker wrong
    pub loose_accepts: u64,
}

/// Pulls aligned frames out of a [`ByteSource`]
pub struct FrameSynchronizer<S> {
    source: S,
    policy: MarkerPolicy,
    max_discard: Option<u64>,
    last_discarded: u64,
    stats: SyncStats,
}

impl<S: ByteSource> FrameSynchronizer<S> {
    /// Create a synchronizer with the loose policy and no discard limit
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: MarkerPolicy::default(),
            max_discard: None,
            last_discarded: 0,
            stats: SyncStats::default(),
        }
    }

    pub fn with_policy(mut self, policy: MarkerPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Give up on a call that would need to discard more than `limit` bytes
    pub fn with_max_discard(mut self, limit: Option<u64>) -> Self {
        self.max_discard = limit;
        self
    }

    pub fn policy(&self) -> MarkerPolicy {
        self.policy
    }

    /// Bytes discarded by the most recent call
    pub fn last_discarded(&self) -> u64 {
        self.last_discarded
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Read the next aligned frame
    ///
    /// Blocks until a frame is aligned. Fails with
    /// [`Error::SourceExhausted`] if the source runs dry (no partial frame
    /// is returned), [`Error::FrameInvariantViolation`] if the source hands
    /// back fewer bytes than requested, and [`Error::ResyncLimitExceeded`]
    /// when a discard limit is set and hit.
    pub fn next_frame(&mut self) -> Result<Frame> {
        let mut window = SlidingWindow::<FRAME_SIZE>::new();
        self.last_discarded = 0;

        let mut initial = [0u8; FRAME_SIZE];
        let n = self.source.fill(&mut initial)?;
        window.extend(&initial[..n.min(FRAME_SIZE)]);
        check_window(&window)?;

        let mut discarded: u64 = 0;
        while !self.is_aligned(&window) {
            if let Some(limit) = self.max_discard
                && discarded >= limit
            {
                self.last_discarded = discarded;
                return Err(Error::ResyncLimitExceeded { discarded });
            }

            window.advance(1);
            let mut byte = [0u8; 1];
            let n = self.source.fill(&mut byte)?;
            window.extend(&byte[..n.min(1)]);
            discarded += 1;
            self.last_discarded = discarded;

            check_window(&window)?;
        }

        let bytes = window.to_array().ok_or(Error::FrameInvariantViolation {
            expected: FRAME_SIZE,
            actual: window.len(),
        })?;
        let frame = Frame::new(bytes);

        if discarded != 0 {
            log::warn!("Discarded {} byte(s) to re-sync.", discarded);
            self.stats.resyncs += 1;
            self.stats.discarded_bytes += discarded;
        }

        if !frame.has_valid_markers() {
            self.stats.loose_accepts += 1;
            log::debug!("Accepted frame with a misplaced marker: {}", frame);
        }

        self.stats.frames += 1;
        Ok(frame)
    }

    fn is_aligned(&self, window: &SlidingWindow<FRAME_SIZE>) -> bool {
        match (window.first(), window.last()) {
            (Some(first), Some(last)) => self.policy.is_aligned(first, last),
            _ => false,
        }
    }
}

/// The window must hold exactly one frame after every read
fn check_window(window: &SlidingWindow<FRAME_SIZE>) -> Result<()> {
    if window.len() != FRAME_SIZE {
        return Err(Error::FrameInvariantViolation {
            expected: FRAME_SIZE,
            actual: window.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{DATA_SIZE, FrameId};
    use crate::source::MockSource;

    fn zero_frame() -> [u8; FRAME_SIZE] {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[0] = START_MARKER;
        bytes[FRAME_SIZE - 1] = END_MARKER;
        bytes
    }

    fn frame(cmd: u8) -> Frame {
        Frame::encode(
            FrameId {
                src: 0x20,
                dst: 0x00,
                cmd,
            },
            [0x10; DATA_SIZE],
        )
    }

    /// Returns nothing for single-byte reads
    struct StutteringSource(MockSource);

    impl ByteSource for StutteringSource {
        fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
            if buf.len() == 1 {
                return Ok(0);
            }
            self.0.fill(buf)
        }
    }

    #[test]
    fn test_two_garbage_bytes_then_frame() {
        let mut stream = vec![0xFF, 0xFF];
        stream.extend_from_slice(&zero_frame());
        let mut sync = FrameSynchronizer::new(MockSource::from_bytes(&stream));

        let frame = sync.next_frame().unwrap();

        assert_eq!(sync.last_discarded(), 2);
        assert_eq!(frame.as_bytes(), &zero_frame());
        assert_eq!(sync.source().remaining(), 0);
    }

    #[test]
    fn test_aligned_stream_passes_through() {
        let frames = [frame(0x52), frame(0x53), frame(0x54)];
        let stream: Vec<u8> = frames.iter().flat_map(|f| f.into_bytes()).collect();
        let mut sync = FrameSynchronizer::new(MockSource::from_bytes(&stream));

        for expected in &frames {
            let got = sync.next_frame().unwrap();
            assert_eq!(&got, expected);
            assert_eq!(sync.last_discarded(), 0);
        }

        let stats = sync.stats();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.discarded_bytes, 0);
        assert_eq!(stats.resyncs, 0);
    }

    #[test]
    fn test_resync_discards_exact_garbage_count() {
        for k in 1..FRAME_SIZE {
            let mut stream = vec![0xEE; k];
            stream.extend_from_slice(&frame(0x53).into_bytes());
            let mut sync = FrameSynchronizer::new(MockSource::from_bytes(&stream));

            let got = sync.next_frame().unwrap();
            assert_eq!(got, frame(0x53), "garbage length {}", k);
            assert_eq!(sync.last_discarded(), k as u64, "garbage length {}", k);
        }
    }

    #[test]
    fn test_resync_with_long_garbage_run() {
        let garbage = FRAME_SIZE * 20 + 3;
        let mut stream = vec![0xFF; garbage];
        stream.extend_from_slice(&frame(0x54).into_bytes());
        stream.extend_from_slice(&frame(0x55).into_bytes());
        let mut sync = FrameSynchronizer::new(MockSource::from_bytes(&stream));

        assert_eq!(sync.next_frame().unwrap(), frame(0x54));
        assert_eq!(sync.last_discarded(), garbage as u64);

        // Alignment carries over to the following frame
        assert_eq!(sync.next_frame().unwrap(), frame(0x55));
        assert_eq!(sync.last_discarded(), 0);

        let stats = sync.stats();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.resyncs, 1);
        assert_eq!(stats.discarded_bytes, garbage as u64);
    }

    #[test]
    fn test_every_frame_is_full_length_with_markers() {
        let mut stream = vec![0x01, 0x02, 0x03];
        stream.extend_from_slice(&frame(0x60).into_bytes());
        stream.extend_from_slice(&[0x99; 5]);
        stream.extend_from_slice(&frame(0x61).into_bytes());
        let mut sync =
            FrameSynchronizer::new(MockSource::from_bytes(&stream)).with_policy(MarkerPolicy::Strict);

        for _ in 0..2 {
            let f = sync.next_frame().unwrap();
            assert_eq!(f.as_bytes().len(), FRAME_SIZE);
            assert_eq!(f.as_bytes()[0], START_MARKER);
            assert_eq!(f.as_bytes()[FRAME_SIZE - 1], END_MARKER);
        }
    }

    #[test]
    fn test_exhaustion_on_initial_read() {
        let mut sync = FrameSynchronizer::new(MockSource::from_bytes(&zero_frame()[..10]));
        assert!(matches!(
            sync.next_frame(),
            Err(Error::SourceExhausted(_))
        ));
        assert_eq!(sync.stats().frames, 0);
    }

    #[test]
    fn test_exhaustion_during_resync() {
        // Garbage but no frame behind it
        let mut sync = FrameSynchronizer::new(MockSource::from_bytes(&[0xFF; FRAME_SIZE + 4]));
        assert!(matches!(
            sync.next_frame(),
            Err(Error::SourceExhausted(_))
        ));
        assert_eq!(sync.last_discarded(), 4);
        assert_eq!(sync.stats().frames, 0);
    }

    #[test]
    fn test_exhaustion_on_empty_source() {
        let mut sync = FrameSynchronizer::new(MockSource::new());
        assert!(matches!(
            sync.next_frame(),
            Err(Error::SourceExhausted(_))
        ));
    }

    #[test]
    fn test_loose_accepts_start_marker_only() {
        let mut broken = zero_frame();
        broken[FRAME_SIZE - 1] = 0x00;
        let mut stream = broken.to_vec();
        stream.extend_from_slice(&zero_frame());

        let mut sync = FrameSynchronizer::new(MockSource::from_bytes(&stream));
        let got = sync.next_frame().unwrap();

        assert_eq!(got.as_bytes(), &broken);
        assert_eq!(sync.last_discarded(), 0);
        assert_eq!(sync.stats().loose_accepts, 1);
    }

    #[test]
    fn test_loose_accepts_end_marker_only() {
        let mut broken = zero_frame();
        broken[0] = 0x00;
        let mut sync = FrameSynchronizer::new(MockSource::from_bytes(&broken));

        let got = sync.next_frame().unwrap();
        assert_eq!(got.as_bytes(), &broken);
        assert_eq!(sync.stats().loose_accepts, 1);
    }

    #[test]
    fn test_strict_resyncs_past_half_marked_window() {
        let mut broken = zero_frame();
        broken[FRAME_SIZE - 1] = 0x00;
        let mut stream = broken.to_vec();
        stream.extend_from_slice(&zero_frame());

        let mut sync =
            FrameSynchronizer::new(MockSource::from_bytes(&stream)).with_policy(MarkerPolicy::Strict);
        let got = sync.next_frame().unwrap();

        assert_eq!(got.as_bytes(), &zero_frame());
        assert_eq!(sync.last_discarded(), FRAME_SIZE as u64);
        assert_eq!(sync.stats().loose_accepts, 0);
    }

    #[test]
    fn test_policy_alignment_table() {
        let cases = [
            (START_MARKER, END_MARKER, true, true),
            (START_MARKER, 0x00, true, false),
            (0x00, END_MARKER, true, false),
            (0x00, 0x00, false, false),
        ];
        for (first, last, loose, strict) in cases {
            assert_eq!(MarkerPolicy::Loose.is_aligned(first, last), loose);
            assert_eq!(MarkerPolicy::Strict.is_aligned(first, last), strict);
        }
    }

    #[test]
    fn test_max_discard_limit() {
        let mut stream = vec![0xFF; 5];
        stream.extend_from_slice(&zero_frame());

        let mut sync =
            FrameSynchronizer::new(MockSource::from_bytes(&stream)).with_max_discard(Some(3));
        assert!(matches!(
            sync.next_frame(),
            Err(Error::ResyncLimitExceeded { discarded: 3 })
        ));
    }

    #[test]
    fn test_max_discard_not_hit() {
        let mut stream = vec![0xFF; 5];
        stream.extend_from_slice(&zero_frame());

        let mut sync =
            FrameSynchronizer::new(MockSource::from_bytes(&stream)).with_max_discard(Some(5));
        assert_eq!(sync.next_frame().unwrap().as_bytes(), &zero_frame());
        assert_eq!(sync.last_discarded(), 5);
    }

    #[test]
    fn test_short_initial_read_violates_invariant() {
        let source = MockSource::from_bytes(&zero_frame());
        source.set_short_reads(true);
        let mut sync = FrameSynchronizer::new(source);

        assert!(matches!(
            sync.next_frame(),
            Err(Error::FrameInvariantViolation {
                expected: FRAME_SIZE,
                actual: 13
            })
        ));
    }

    #[test]
    fn test_short_resync_read_violates_invariant() {
        let mut stream = vec![0xFF];
        stream.extend_from_slice(&zero_frame());
        let mut sync = FrameSynchronizer::new(StutteringSource(MockSource::from_bytes(&stream)));

        assert!(matches!(
            sync.next_frame(),
            Err(Error::FrameInvariantViolation {
                expected: FRAME_SIZE,
                actual: 13
            })
        ));
    }
}
