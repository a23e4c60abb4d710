//! Keyrack Server Binary
//!
//! Starts the TCP server for Keyrack.

use std::sync::Arc;

use clap::Parser;
use keyrack::{Config, KeyrackError, Server, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// Keyrack Server
#[derive(Parser, Debug)]
#[command(name = "keyrack-server")]
#[command(about = "Minimal networked key-value store")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8765")]
    listen: String,

    /// Maximum concurrent sessions
    #[arg(short, long, default_value = "1024")]
    max_sessions: usize,

    /// Close sessions idle for this many milliseconds (0 = never)
    #[arg(short, long, default_value = "0")]
    idle_timeout_ms: u64,

    /// Give up on a response write after this many milliseconds (0 = never)
    #[arg(short, long, default_value = "5000")]
    write_timeout_ms: u64,

    /// Largest accepted frame in KiB
    #[arg(short = 'f', long, default_value = "16384")]
    max_frame_kb: usize,
}

/// Map command line arguments onto a validated config
fn build_config(args: &Args) -> keyrack::Result<Config> {
    let max_frame_size = args.max_frame_kb.checked_mul(1024).ok_or_else(|| {
        KeyrackError::Config(format!("max frame size of {} KiB overflows", args.max_frame_kb))
    })?;

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_sessions(args.max_sessions)
        .idle_timeout_ms(args.idle_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .max_frame_size(max_frame_size)
        .build();

    config.validate()?;
    Ok(config)
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,keyrack=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Keyrack Server v{}", keyrack::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(Store::new());

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start listener: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
