//! UDP broadcast sink

use super::DatagramSink;
use crate::config::BroadcastConfig;
use crate::error::{Error, Result};
use std::net::{SocketAddr, UdpSocket};

/// Sends every payload to `address:port` with `SO_BROADCAST` enabled
pub struct UdpBroadcaster {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpBroadcaster {
    /// Bind an ephemeral socket and enable broadcast
    ///
    /// We only send, so the local port does not matter.
    pub fn bind(config: &BroadcastConfig) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_broadcast(true)?;

        let target = SocketAddr::new(config.address, config.port);
        log::info!("UDP broadcast enabled -> {}", target);

        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl DatagramSink for UdpBroadcaster {
    fn send(&mut self, payload: &[u8]) -> Result<()> {
        let sent = self
            .socket
            .send_to(payload, self.target)
            .map_err(Error::Send)?;

        if sent != payload.len() {
            return Err(Error::ShortSend {
                sent,
                expected: payload.len(),
            });
        }
        Ok(())
    }
}
