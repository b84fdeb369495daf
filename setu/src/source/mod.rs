//! Byte sources feeding the frame synchronizer
//!
//! A source is anything that can block until a requested number of bytes
//! has arrived. Two real sources are provided, both built on [`StreamSource`]:
//!
//! | URL                         | Source                     |
//! |-----------------------------|----------------------------|
//! | `/dev/ttyUSB0`, `COM3`      | serial port                |
//! | `serial:///dev/ttyUSB0`     | serial port                |
//! | `tcp+raw://host:port`       | raw TCP (serial-over-LAN)  |
//!
//! [`MockSource`] replays injected bytes for tests.

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use url::Url;

mod mock;
mod serial;
mod stream;
mod tcp;

pub use mock::MockSource;
pub use serial::{SerialSource, open_serial};
pub use stream::StreamSource;
pub use tcp::{TcpSource, open_tcp};

/// Blocking byte source
pub trait ByteSource {
    /// Fill `buf` completely, blocking until every byte has arrived
    ///
    /// Returns the number of bytes written, which equals `buf.len()` for a
    /// well-behaved source. Fails with [`Error::SourceExhausted`] on end of
    /// stream or a read error.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).fill(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).fill(buf)
    }
}

/// Parsed source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceUrl {
    /// Serial device path
    Serial(String),
    /// Raw TCP stream
    TcpRaw { host: String, port: u16 },
}

impl SourceUrl {
    /// Parse a device path or source URL
    ///
    /// Anything without a `scheme://` prefix is taken as a serial device path.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::UnsupportedSource("empty source".to_string()));
        }
        if !s.contains("://") {
            return Ok(Self::Serial(s.to_string()));
        }

        let url = Url::parse(s).map_err(|e| Error::UnsupportedSource(format!("{}: {}", s, e)))?;

        match url.scheme() {
            "serial" => {
                // serial://COM3 puts the port name in the host position
                let path = match url.path() {
                    "" | "/" => url.host_str().unwrap_or_default(),
                    path => path,
                };
                if path.is_empty() {
                    return Err(Error::UnsupportedSource(format!(
                        "serial url requires a device path: {}",
                        s
                    )));
                }
                Ok(Self::Serial(path.to_string()))
            }
            "tcp+raw" => {
                let host = url.host_str().ok_or_else(|| {
                    Error::UnsupportedSource(format!("tcp+raw url requires a host: {}", s))
                })?;
                let port = url.port().ok_or_else(|| {
                    Error::UnsupportedSource(format!("tcp+raw url requires a port: {}", s))
                })?;
                Ok(Self::TcpRaw {
                    host: host.to_string(),
                    port,
                })
            }
            other => Err(Error::UnsupportedSource(format!(
                "url scheme {} not supported",
                other
            ))),
        }
    }
}

/// Open the source named in the configuration
///
/// `running` is polled between read timeouts; clearing it makes a pending
/// read fail with [`Error::Interrupted`].
pub fn open(config: &SourceConfig, running: Arc<AtomicBool>) -> Result<Box<dyn ByteSource + Send>> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| Error::Config("no byte source configured".to_string()))?;

    match SourceUrl::parse(url)? {
        SourceUrl::Serial(path) => Ok(Box::new(open_serial(&path, config, running)?)),
        SourceUrl::TcpRaw { host, port } => Ok(Box::new(open_tcp(&host, port, config, running)?)),
    }
}
