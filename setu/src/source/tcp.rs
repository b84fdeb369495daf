//! Raw TCP source for serial-to-network adapters

use super::StreamSource;
use crate::config::SourceConfig;
use crate::error::Result;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Byte source reading from a raw TCP stream
pub type TcpSource = StreamSource<TcpStream>;

/// Connect to `host:port` and read it as a byte stream
pub fn open_tcp(
    host: &str,
    port: u16,
    config: &SourceConfig,
    running: Arc<AtomicBool>,
) -> Result<TcpSource> {
    let stream = TcpStream::connect((host, port)).inspect_err(|e| {
        log::error!("Failed to connect to {}:{}: {}", host, port, e);
    })?;
    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(config.poll_interval()))?;

    log::info!("Connected to raw TCP source {}:{}", host, port);

    let name = format!("{}:{}", host, port);
    Ok(StreamSource::new(stream, name, running).with_read_timeout(config.read_timeout()))
}
