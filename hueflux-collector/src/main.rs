use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;

use hueflux_common::init_tracing;

use hueflux_collector::bridge::HubClient;
use hueflux_collector::config::CollectorConfig;
use hueflux_collector::poller::{Delivery, Poller};
use hueflux_collector::sink::{InfluxSink, local_host_tag};

/// Hue hub to InfluxDB telemetry collector.
#[derive(Parser, Debug)]
#[command(name = "hueflux-collector")]
#[command(about = "Collect hub sensor and light state into InfluxDB", long_about = None)]
struct Args {
    /// Path to the configuration file (JSON5 format).
    #[arg(short, long, default_value = "hueflux.json5")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Fetch one raw hub snapshot, print it, and exit.
    #[arg(long)]
    dump_devices: bool,

    /// Print encoded lines to stdout instead of writing to the sink.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = CollectorConfig::load(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    // Initialize tracing
    init_tracing(&config.logging).context("Failed to initialize tracing")?;

    tracing::info!(
        config = ?args.config,
        hub = %config.hub.host,
        interval_secs = config.interval_secs,
        "Starting hueflux-collector"
    );

    let hub =
        HubClient::new(&config.hub.host, &config.hub.user).context("Failed to create hub client")?;

    if args.dump_devices {
        let devices = hub.fetch_raw().await.context("Failed to fetch hub state")?;
        let dump = serde_json::json!({
            "fetched_at": chrono::Local::now().to_rfc3339(),
            "devices": devices,
        });
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    let mut tags = config.tags.clone();
    if !tags.contains_key("host") {
        if let Some(host) = local_host_tag(&config.influx.write_url()) {
            tags.insert("host".to_string(), host);
        }
    }

    let delivery = if args.dry_run {
        tracing::info!("Dry-run mode: printing lines instead of sending");
        Delivery::Stdout
    } else {
        Delivery::Sink(InfluxSink::new(&config.influx).context("Failed to create sink client")?)
    };

    let poller = Poller::new(&config, hub, delivery, tags);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(poller.run(shutdown_rx));

    // Wait for shutdown signal
    signal::ctrl_c().await.context("Failed to listen for Ctrl+C")?;

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(true);
    let _ = task.await;

    tracing::info!("Goodbye!");

    Ok(())
}
