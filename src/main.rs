use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rov_teleop_bridge::config::BridgeConfig;

/// Joystick to serial motor controller bridge
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port of the motor controller (auto-detected if omitted)
    #[arg(short, long)]
    port: Option<String>,

    #[arg(long)]
    baud_rate: Option<u32>,

    #[arg(long)]
    write_timeout_ms: Option<u64>,

    /// Substring matched against port metadata during auto-detection
    #[arg(long)]
    device_match: Option<String>,

    /// Control loop rate in Hz (1 to 1000)
    #[arg(long)]
    hz: Option<u64>,

    /// Print each input snapshot as a JSON line
    #[arg(long)]
    dump_input: bool,
}

impl Args {
    fn into_config(
        self,
    ) -> Result<(BridgeConfig, bool), Box<dyn std::error::Error + Send + Sync>> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::default(),
        };

        if self.port.is_some() {
            config.link.port = self.port;
        }
        if let Some(baud_rate) = self.baud_rate {
            config.link.baud_rate = baud_rate;
        }
        if let Some(timeout) = self.write_timeout_ms {
            config.link.write_timeout_ms = timeout;
        }
        if let Some(pattern) = self.device_match {
            config.link.device_match = pattern;
        }
        if let Some(hz) = self.hz {
            config.loop_hz = hz;
        }
        config.validate()?;

        Ok((config, self.dump_input))
    }
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match Args::parse().into_config() {
        Ok((config, dump_input)) => rov_teleop_bridge::runtime::run(config, dump_input).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Bridge error: {}", e);
        std::process::exit(1);
    }
}
