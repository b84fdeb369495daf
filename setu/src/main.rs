//! Setu - serial frame bridge daemon
//!
//! Reads frames from a serial bus and re-broadcasts each one on the LAN:
//!
//! ```text
//! setu /dev/ttyUSB0                      # broadcast to 255.255.255.255:45654
//! setu --port 50000 serial:///dev/ttyS1
//! setu tcp+raw://10.0.0.7:4001 --strict
//! setu --config /etc/setu.toml
//! ```
//!
//! Exits 0 on Ctrl-C, 1 on any fatal error (source lost, socket failure).

use clap::Parser;
use setu::config::{BridgeConfig, Parity};
use setu::{Bridge, FrameSynchronizer, MarkerPolicy, Result, SendErrorPolicy, UdpBroadcaster};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Forward fixed-size serial frames as UDP broadcasts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial device path or source URL (serial://, tcp+raw://host:port)
    source: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// UDP destination port
    #[arg(short, long)]
    port: Option<u16>,

    /// Broadcast address
    #[arg(long)]
    address: Option<IpAddr>,

    /// Serial baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Serial parity
    #[arg(long, value_enum)]
    parity: Option<Parity>,

    /// Require both frame markers before accepting a frame
    #[arg(long)]
    strict: bool,

    /// Fail after discarding this many bytes in a single re-sync
    #[arg(long)]
    max_discard: Option<u64>,

    /// Log send errors instead of exiting
    #[arg(long)]
    keep_going: bool,
}

/// Layer command-line flags over the file (or default) configuration
fn resolve_config(args: &Args) -> Result<BridgeConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Using config: {}", path.display());
            BridgeConfig::load(path)?
        }
        None => BridgeConfig::default(),
    };

    if let Some(source) = &args.source {
        config.source.url = Some(source.clone());
    }
    if let Some(port) = args.port {
        config.broadcast.port = port;
    }
    if let Some(address) = args.address {
        config.broadcast.address = address;
    }
    if let Some(baud) = args.baud {
        config.source.baud_rate = baud;
    }
    if let Some(parity) = args.parity {
        config.source.parity = parity;
    }
    if args.strict {
        config.sync.policy = MarkerPolicy::Strict;
    }
    if args.max_discard.is_some() {
        config.sync.max_discard = args.max_discard;
    }
    if args.keep_going {
        config.broadcast.send_errors = SendErrorPolicy::Log;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| setu::Error::Config(format!("Error setting Ctrl-C handler: {}", e)))?;

    let source = setu::source::open(&config.source, Arc::clone(&running))?;
    let sink = UdpBroadcaster::bind(&config.broadcast)?;

    let sync = FrameSynchronizer::new(source)
        .with_policy(config.sync.policy)
        .with_max_discard(config.sync.max_discard);
    let mut bridge = Bridge::new(sync, sink).with_send_policy(config.broadcast.send_errors);

    log::info!("Setu running. Press Ctrl-C to stop.");
    bridge.run(&running)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Setu v{} starting...", env!("CARGO_PKG_VERSION"));

    match run(Args::parse()) {
        Ok(()) => {
            log::info!("Setu stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
