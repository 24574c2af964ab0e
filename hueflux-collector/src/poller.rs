//! The poll-normalize-emit loop.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use hueflux_common::encode_line;

use crate::bridge::HubClient;
use crate::config::CollectorConfig;
use crate::names::NameMap;
use crate::normalize::TemperatureUnit;
use crate::sink::InfluxSink;
use crate::snapshot::build_snapshot;

/// Where encoded lines go.
pub enum Delivery {
    /// Normal operation: write to the sink.
    Sink(InfluxSink),
    /// Dry-run mode: print to stdout instead.
    Stdout,
}

/// Drives the fixed-interval collection loop.
pub struct Poller {
    hub: HubClient,
    delivery: Delivery,
    names: NameMap,
    units: TemperatureUnit,
    interval: Duration,
    measurement: String,
    tags: BTreeMap<String, String>,
}

impl Poller {
    /// Create a poller from the loaded configuration.
    pub fn new(
        config: &CollectorConfig,
        hub: HubClient,
        delivery: Delivery,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            hub,
            delivery,
            names: NameMap::new(config.sensors.clone()),
            units: config.temperature_units,
            interval: Duration::from_secs(config.interval_secs),
            measurement: config.influx.measurement.clone(),
            tags,
        }
    }

    /// Run the loop until the shutdown channel flips.
    ///
    /// Cadence is anchored to a `next_tick` deadline advanced by one
    /// interval before each iteration's work, so the long-run average
    /// period stays at the configured interval regardless of how long
    /// fetch and delivery take. An interrupt unblocks a pending sleep
    /// promptly; an in-flight fetch or write finishes (or times out) on
    /// its own first.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            measurement = %self.measurement,
            mapped_names = self.names.len(),
            "Starting collector loop"
        );

        let mut next_tick = Instant::now();

        loop {
            if *shutdown.borrow() {
                break;
            }

            next_tick += self.interval;
            self.tick().await;
            next_tick = next_deadline(next_tick, Instant::now());

            tokio::select! {
                _ = time::sleep_until(next_tick) => {}
                _ = shutdown.changed() => {
                    info!("Shutdown requested, stopping collector loop");
                    break;
                }
            }
        }
    }

    /// One fetch -> build -> encode -> deliver cycle.
    ///
    /// A fetch failure is logged and treated like an empty fetch; a
    /// delivery failure is logged and the snapshot dropped. Neither stops
    /// the loop.
    async fn tick(&self) {
        let records = match self.hub.fetch_devices().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Hub fetch failed, treating as empty");
                Vec::new()
            }
        };

        let snapshot = build_snapshot(&records, &self.names, self.units);
        let samples = snapshot.len();

        let Some(line) = encode_line(&self.measurement, &self.tags, &snapshot) else {
            debug!(devices = records.len(), "Nothing to send this tick");
            return;
        };

        match &self.delivery {
            Delivery::Sink(sink) => match sink.write(&line).await {
                Ok(()) => debug!(samples, "Snapshot delivered"),
                Err(e) => warn!(error = %e, samples, "Delivery failed, dropping snapshot"),
            },
            Delivery::Stdout => println!("{}", line),
        }
    }
}

/// Deadline for the next wake: the scheduled tick, or now when the work
/// overran the interval. Clamping to now means an overrun fires the next
/// tick immediately without accumulating a backlog of missed ticks.
fn next_deadline(next_tick: Instant, now: Instant) -> Instant {
    if next_tick < now { now } else { next_tick }
}
