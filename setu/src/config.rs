//! Configuration for Setu
//!
//! Loaded from an optional TOML file; command-line flags are applied on top
//! in `main.rs`. Every field has a default except the source URL.
//!
//! ```toml
//! [source]
//! url = "/dev/ttyUSB0"
//! baud_rate = 9600
//! parity = "none"
//!
//! [broadcast]
//! port = 45654
//!
//! [sync]
//! policy = "loose"
//! ```

use crate::bridge::SendErrorPolicy;
use crate::error::{Error, Result};
use crate::sync::MarkerPolicy;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

/// Default UDP destination port
pub const DEFAULT_PORT: u16 = 45654;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Byte source settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Serial device path or source URL (`serial://`, `tcp+raw://`)
    #[serde(default)]
    pub url: Option<String>,

    /// Serial baud rate (default: 9600)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Serial parity (default: none)
    #[serde(default)]
    pub parity: Parity,

    /// How often a blocked read wakes up to check for shutdown (default: 100ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up when no byte arrives for this long (default: wait forever)
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
}

/// Datagram destination settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BroadcastConfig {
    /// Destination address (default: 255.255.255.255)
    #[serde(default = "default_broadcast_address")]
    pub address: IpAddr,

    /// Destination UDP port (default: 45654)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Behaviour on send failure (default: fatal)
    #[serde(default)]
    pub send_errors: SendErrorPolicy,
}

/// Frame synchronizer settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Marker check (default: loose)
    #[serde(default)]
    pub policy: MarkerPolicy,

    /// Fail after discarding this many bytes in one re-sync (default: unbounded)
    #[serde(default)]
    pub max_discard: Option<u64>,
}

/// Serial parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Even => serialport::Parity::Even,
            Parity::Odd => serialport::Parity::Odd,
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Parity::None => "none",
            Parity::Even => "even",
            Parity::Odd => "odd",
        })
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            baud_rate: default_baud_rate(),
            parity: Parity::default(),
            poll_interval_ms: default_poll_interval_ms(),
            read_timeout_ms: None,
        }
    }
}

impl SourceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            address: default_broadcast_address(),
            port: default_port(),
            send_errors: SendErrorPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reject values the bridge cannot run with
    pub fn validate(&self) -> Result<()> {
        match self.source.url.as_deref() {
            None | Some("") => {
                return Err(Error::Config(
                    "no byte source given (set source.url or pass SOURCE)".to_string(),
                ));
            }
            Some(_) => {}
        }
        if self.source.baud_rate == 0 {
            return Err(Error::Config("source.baud_rate must be > 0".to_string()));
        }
        if self.source.poll_interval_ms == 0 {
            return Err(Error::Config(
                "source.poll_interval_ms must be > 0".to_string(),
            ));
        }
        if !self.broadcast.address.is_ipv4() {
            return Err(Error::Config(format!(
                "broadcast.address must be IPv4, got {}",
                self.broadcast.address
            )));
        }
        if self.broadcast.port == 0 {
            return Err(Error::Config("broadcast.port must be > 0".to_string()));
        }
        Ok(())
    }
}

// Default value functions
fn default_baud_rate() -> u32 {
    9600
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_broadcast_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::BROADCAST)
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
