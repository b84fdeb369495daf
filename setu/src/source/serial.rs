//! Serial port source

use super::StreamSource;
use crate::config::SourceConfig;
use crate::error::Result;
use serialport::{ClearBuffer, DataBits, FlowControl, SerialPort, StopBits};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Byte source reading from a UART
pub type SerialSource = StreamSource<Box<dyn SerialPort>>;

/// Open a serial port
///
/// # Arguments
/// * `path` - Serial port path (e.g., "/dev/ttyUSB0")
/// * `config` - Line settings and poll/stall timeouts
/// * `running` - Shutdown flag checked between poll timeouts
pub fn open_serial(
    path: &str,
    config: &SourceConfig,
    running: Arc<AtomicBool>,
) -> Result<SerialSource> {
    let port = serialport::new(path, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(config.parity.into())
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.poll_interval())
        .open()?;

    log::info!(
        "Opened serial port: {} at {} baud (parity: {})",
        path,
        config.baud_rate,
        config.parity
    );

    // Bytes queued before we opened belong to some earlier frame
    if let Err(e) = port.clear(ClearBuffer::Input) {
        log::warn!("Failed to clear stale input on {}: {}", path, e);
    }

    Ok(StreamSource::new(port, path, running).with_read_timeout(config.read_timeout()))
}
