use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use launchpad::{intensity, Launchpad, LaunchpadConfig};

/// Light up Launchpad pads as they are pressed.
#[derive(Parser, Debug)]
#[command(name = "padlight")]
#[command(about = "Launchpad press-to-light demo")]
struct Args {
    /// JSON config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Substring of the MIDI port name to connect to
    #[arg(long)]
    device: Option<String>,

    /// Polling interval in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Green intensity for pressed pads (0-3)
    #[arg(long, default_value_t = intensity::FULL)]
    green: u8,

    /// Red intensity for pressed pads (0-3)
    #[arg(long, default_value_t = intensity::OFF)]
    red: u8,

    /// Clear the grid before exiting
    #[arg(long)]
    reset: bool,
}

fn load_config(args: &Args) -> anyhow::Result<LaunchpadConfig> {
    let mut config = match &args.config {
        Some(path) => LaunchpadConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LaunchpadConfig::default(),
    };

    if let Some(device) = &args.device {
        config.device_name = device.clone();
    }
    if let Some(poll_ms) = args.poll_ms {
        config.poll_interval_ms = poll_ms;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let mut pad = Launchpad::with_config(config)?;
    pad.reset()?;

    let mut hits = pad.listen()?;
    log::info!("Listening for presses, Ctrl-C to quit");

    loop {
        tokio::select! {
            hit = hits.next() => {
                let Some(hit) = hit else { break };
                log::info!("Pressed {}", hit);
                if let Err(e) = pad.light(hit.x, hit.y, args.green, args.red) {
                    log::warn!("Failed to light {}: {}", hit, e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutting down");
                break;
            }
        }
    }

    if args.reset {
        pad.reset()?;
    }
    pad.cleanup()?;
    Ok(())
}
