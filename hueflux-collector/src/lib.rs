//! Hue hub to InfluxDB telemetry collector.
//!
//! Polls the hub for sensor and light state on a fixed interval,
//! normalizes each device reading into a named numeric value, and writes
//! the resulting snapshot to InfluxDB as one line-protocol point:
//!
//! ```text
//! hue,host=192_168_1_50 Kitchen=21.5,Hallway_motion=1,Desk_lamp=50
//! ```

pub mod bridge;
pub mod config;
pub mod names;
pub mod normalize;
pub mod poller;
pub mod sink;
pub mod snapshot;
