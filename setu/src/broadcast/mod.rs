//! Datagram sinks for validated frames
//!
//! Each frame goes out as exactly one datagram, byte-for-byte as the
//! synchronizer produced it. Delivery is fire-and-forget: there is no
//! acknowledgment and no retry, and a datagram lost on the wire is never
//! noticed. Only local socket errors surface as [`Error::Send`].
//!
//! [`Error::Send`]: crate::error::Error::Send

mod recording;
mod udp;

pub use recording::RecordingSink;
pub use udp::UdpBroadcaster;

use crate::error::Result;

/// Connectionless datagram sink
pub trait DatagramSink {
    /// Send one datagram carrying `payload` unmodified
    fn send(&mut self, payload: &[u8]) -> Result<()>;
}

impl<D: DatagramSink + ?Sized> DatagramSink for Box<D> {
    fn send(&mut self, payload: &[u8]) -> Result<()> {
        (**self).send(payload)
    }
}

impl<D: DatagramSink + ?Sized> DatagramSink for &mut D {
    fn send(&mut self, payload: &[u8]) -> Result<()> {
        (**self).send(payload)
    }
}
