mod bridge;
mod config;

use anyhow::{Context, Result};
use bridge::Bridge;
use clap::Parser;
use config::Config;
use hubspace_devices::load_snapshot;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .target(env_logger::Target::Stderr)
        .init();

    let devices = match &config.devices {
        Some(path) => load_snapshot(path)
            .with_context(|| format!("loading device snapshot {}", path.display()))?,
        None => {
            log::warn!("No device snapshot given; only extract_functions will return data");
            Vec::new()
        }
    };

    let mut bridge = Bridge::new(devices);
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    log::info!("Bridge ready, waiting for requests");

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let mut response = bridge.handle_line(&line);
        response.push('\n');
        stdout.write_all(response.as_bytes()).await?;
        stdout.flush().await?;
    }

    log::info!("stdin closed, shutting down");
    Ok(())
}
