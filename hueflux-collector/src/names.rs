//! Device name resolution.
//!
//! Maps a device's raw display name to the metric name written to the
//! sink. The mapping table comes from configuration; devices without an
//! entry keep their display name. Either way the result is sanitized for
//! line protocol. An entry explicitly mapped to nothing drops the device:
//! a deliberate configuration choice, not a lookup accident.

use std::collections::HashMap;

/// Outcome of resolving one raw display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The configured metric name.
    Mapped(String),
    /// No entry; the sanitized display name is used as-is.
    Fallback(String),
    /// Explicitly unmapped; the device is excluded from snapshots.
    Dropped,
}

impl Resolution {
    /// The metric name to emit, or `None` for dropped devices.
    pub fn into_name(self) -> Option<String> {
        match self {
            Resolution::Mapped(name) | Resolution::Fallback(name) => Some(name),
            Resolution::Dropped => None,
        }
    }
}

/// Raw display name -> metric name mapping table.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    entries: HashMap<String, Option<String>>,
}

impl NameMap {
    /// Build from the configured `sensors` table. A `None` value marks a
    /// device as explicitly dropped.
    pub fn new(entries: HashMap<String, Option<String>>) -> Self {
        Self { entries }
    }

    /// Resolve a raw display name.
    pub fn resolve(&self, raw: &str) -> Resolution {
        match self.entries.get(raw) {
            Some(Some(mapped)) => Resolution::Mapped(sanitize_name(mapped)),
            Some(None) => Resolution::Dropped,
            None => Resolution::Fallback(sanitize_name(raw)),
        }
    }

    /// Number of configured entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any entries are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replace spaces with underscores so the name is a valid line-protocol
/// key.
pub fn sanitize_name(name: &str) -> String {
    name.replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, Option<&str>)]) -> NameMap {
        NameMap::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(String::from)))
                .collect(),
        )
    }

    #[test]
    fn test_mapped_name() {
        let names = map(&[("Kitchen sensor", Some("kitchen_temp"))]);
        assert_eq!(
            names.resolve("Kitchen sensor"),
            Resolution::Mapped("kitchen_temp".to_string())
        );
    }

    #[test]
    fn test_fallback_sanitizes_raw_name() {
        let names = NameMap::default();
        assert_eq!(
            names.resolve("Hallway motion sensor"),
            Resolution::Fallback("Hallway_motion_sensor".to_string())
        );
    }

    #[test]
    fn test_explicitly_dropped() {
        let names = map(&[("Old sensor", None)]);
        assert_eq!(names.resolve("Old sensor"), Resolution::Dropped);
        assert_eq!(names.resolve("Old sensor").into_name(), None);
    }

    #[test]
    fn test_mapped_names_are_sanitized_too() {
        let names = map(&[("Kitchen", Some("kitchen temp"))]);
        assert_eq!(
            names.resolve("Kitchen"),
            Resolution::Mapped("kitchen_temp".to_string())
        );
    }

    #[test]
    fn test_idempotent_on_clean_names() {
        let names = NameMap::default();
        let once = names.resolve("Kitchen").into_name().unwrap();
        let twice = names.resolve(&once).into_name().unwrap();
        assert_eq!(once, "Kitchen");
        assert_eq!(once, twice);
    }
}
