//! InfluxDB line-protocol encoding.
//!
//! One snapshot becomes one line:
//!
//! ```text
//! <measurement>,<tag>=<value>[,...] <field>=<value>[,...]
//! ```
//!
//! No timestamp is appended; the write endpoint carries `precision=s` and
//! the sink assigns receipt time. Escaping is deliberately minimal: metric
//! names are space-free by the time they reach the encoder, and tag values
//! are deployment constants. Commas or equals signs inside names are not
//! escaped.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::sample::Snapshot;

/// Encode a snapshot as a single line-protocol write.
///
/// Returns `None` for an empty snapshot (a measurement with no fields is
/// not a valid line) and for snapshots whose every value is non-finite.
/// Callers treat `None` as "nothing to send".
pub fn encode_line(
    measurement: &str,
    tags: &BTreeMap<String, String>,
    snapshot: &Snapshot,
) -> Option<String> {
    let mut line = String::from(measurement);

    for (key, value) in tags {
        write!(line, ",{}={}", key, value).ok()?;
    }

    let mut first = true;
    for (name, value) in snapshot {
        if !value.is_finite() {
            continue;
        }
        let sep = if first { ' ' } else { ',' };
        write!(line, "{}{}={}", sep, name, value).ok()?;
        first = false;
    }

    if first {
        // No fields survived; nothing to send.
        return None;
    }

    Some(line)
}
