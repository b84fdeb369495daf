//! Setu - serial frame bridge
//!
//! Reads a raw byte stream from a serial device, re-synchronizes on fixed
//! 14-byte frames delimited by start/end marker bytes, and forwards each
//! aligned frame as one UDP broadcast datagram.
//!
//! ```text
//! ByteSource ──> FrameSynchronizer ──> Frame ──> DatagramSink
//!  (serial,        (sliding window,              (UDP broadcast,
//!   tcp+raw)        marker policy)                fire-and-forget)
//! ```
//!
//! [`Bridge`] ties the pieces into the blocking forwarding loop used by the
//! `setu` binary.

pub mod bridge;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod frame;
pub mod source;
pub mod sync;

// Re-export commonly used types
pub use bridge::{Bridge, BridgeStats, SendErrorPolicy};
pub use broadcast::{DatagramSink, UdpBroadcaster};
pub use config::BridgeConfig;
pub use error::{Error, Result};
pub use frame::{END_MARKER, FRAME_SIZE, Frame, FrameId, START_MARKER};
pub use source::ByteSource;
pub use sync::{FrameSynchronizer, MarkerPolicy, SyncStats};
