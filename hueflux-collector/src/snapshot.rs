//! Per-tick snapshot assembly.

use tracing::debug;

use hueflux_common::Snapshot;

use crate::bridge::DeviceRecord;
use crate::names::{NameMap, Resolution};
use crate::normalize::{TemperatureUnit, normalize};

/// Build one snapshot from a hub fetch result.
///
/// Devices resolve their metric name first, then normalize. Explicitly
/// dropped devices and unrecognized kinds contribute nothing. Devices
/// sharing a resolved name overwrite each other (last write wins; shared
/// names are a configuration responsibility). An empty fetch yields an
/// empty snapshot.
pub fn build_snapshot(
    records: &[DeviceRecord],
    names: &NameMap,
    units: TemperatureUnit,
) -> Snapshot {
    let mut snapshot = Snapshot::new();

    for record in records {
        let name = match names.resolve(&record.name) {
            Resolution::Mapped(name) | Resolution::Fallback(name) => name,
            Resolution::Dropped => {
                debug!(device = %record.name, "Device explicitly unmapped, skipping");
                continue;
            }
        };

        if name.is_empty() {
            debug!(id = %record.id, "Device resolves to an empty name, skipping");
            continue;
        }

        let Some(value) = normalize(record, units) else {
            continue;
        };

        snapshot.insert(name, value);
    }

    snapshot
}
