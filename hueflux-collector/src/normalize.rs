//! Per-kind conversion of raw device readings into sample values.

use serde::{Deserialize, Serialize};

use hueflux_common::Value;

use crate::bridge::{DeviceKind, DeviceRecord, DeviceState};

/// Target unit for temperature readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
    #[serde(rename = "K")]
    Kelvin,
}

/// Convert one device record into a sample value.
///
/// Returns `None` for unrecognized kinds and for records missing their
/// kind-specific state field; neither is an error, the device simply
/// contributes nothing to the snapshot.
pub fn normalize(record: &DeviceRecord, units: TemperatureUnit) -> Option<Value> {
    match &record.kind {
        DeviceKind::Temperature => record
            .state
            .temperature
            .map(|raw| Value::Float(normalize_temperature(raw, units))),
        DeviceKind::LightLevel => record
            .state
            .lightlevel
            .map(|raw| Value::Float(normalize_lightlevel(raw))),
        DeviceKind::Presence => record.state.presence.map(|p| Value::Int(p as i64)),
        DeviceKind::Actuator => normalize_actuator(&record.state),
        DeviceKind::Other(_) => None,
    }
}

/// Raw hundredths of a degree Celsius to the configured unit, rounded to
/// two decimal places.
pub fn normalize_temperature(raw: i64, units: TemperatureUnit) -> f64 {
    let celsius = raw as f64 / 100.0;
    let converted = match units {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 1.8 + 32.0,
        TemperatureUnit::Kelvin => celsius + 273.15,
    };
    round2(converted)
}

/// Raw logarithmic encoding to lux, rounded to two decimal places.
///
/// The hub reports `10000 * log10(lux) + 1`; a raw value of 0 means
/// "below measurable range" and still goes through the formula (the
/// exponent stays finite).
pub fn normalize_lightlevel(raw: i64) -> f64 {
    round2(10f64.powf((raw as f64 - 1.0) / 10000.0))
}

/// Actuator state to a 0-100 value.
///
/// Off dominates: brightness is ignored when the device is off. On
/// devices report their brightness scaled from the hub's 0-254 range to a
/// truncated percentage, or 1 when they have no brightness at all.
fn normalize_actuator(state: &DeviceState) -> Option<Value> {
    let on = state.on?;
    if !on {
        return Some(Value::Int(0));
    }
    Some(match state.bri {
        Some(bri) => Value::Int((bri as f64 / 2.54) as i64),
        None => Value::Int(1),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: DeviceKind, state: DeviceState) -> DeviceRecord {
        DeviceRecord {
            id: "1".to_string(),
            name: "test".to_string(),
            kind,
            state,
        }
    }

    #[test]
    fn test_temperature_units() {
        assert_eq!(normalize_temperature(2150, TemperatureUnit::Celsius), 21.5);
        assert_eq!(
            normalize_temperature(2150, TemperatureUnit::Fahrenheit),
            70.7
        );
        assert_eq!(normalize_temperature(2150, TemperatureUnit::Kelvin), 294.65);
        assert_eq!(normalize_temperature(-500, TemperatureUnit::Celsius), -5.0);
        assert_eq!(normalize_temperature(0, TemperatureUnit::Fahrenheit), 32.0);
    }

    #[test]
    fn test_temperature_rounding() {
        // 21.4999... degrees in raw hundredths is already exact; force a
        // rounding case through Fahrenheit: 21.55 C * 1.8 + 32 = 70.79
        assert_eq!(
            normalize_temperature(2155, TemperatureUnit::Fahrenheit),
            70.79
        );
    }

    #[test]
    fn test_lightlevel() {
        // 10^((raw - 1) / 10000)
        assert_eq!(normalize_lightlevel(1), 1.0);
        assert_eq!(normalize_lightlevel(10001), 10.0);
        assert_eq!(normalize_lightlevel(20001), 100.0);
        // Raw 0 is the hub's "below measurable range" and must not error.
        assert_eq!(normalize_lightlevel(0), 1.0);
    }

    #[test]
    fn test_presence() {
        let present = record(
            DeviceKind::Presence,
            DeviceState {
                presence: Some(true),
                ..Default::default()
            },
        );
        let absent = record(
            DeviceKind::Presence,
            DeviceState {
                presence: Some(false),
                ..Default::default()
            },
        );
        assert_eq!(
            normalize(&present, TemperatureUnit::Celsius),
            Some(Value::Int(1))
        );
        assert_eq!(
            normalize(&absent, TemperatureUnit::Celsius),
            Some(Value::Int(0))
        );
    }

    #[test]
    fn test_actuator_off_ignores_brightness() {
        let state = DeviceState {
            on: Some(false),
            bri: Some(254),
            ..Default::default()
        };
        assert_eq!(normalize_actuator(&state), Some(Value::Int(0)));
    }

    #[test]
    fn test_actuator_brightness_scaling() {
        for (bri, expected) in [(254u8, 100i64), (127, 50), (64, 25), (1, 0), (0, 0)] {
            let state = DeviceState {
                on: Some(true),
                bri: Some(bri),
                ..Default::default()
            };
            assert_eq!(normalize_actuator(&state), Some(Value::Int(expected)));
        }
    }

    #[test]
    fn test_plain_switch_reports_one() {
        let state = DeviceState {
            on: Some(true),
            ..Default::default()
        };
        assert_eq!(normalize_actuator(&state), Some(Value::Int(1)));
    }

    #[test]
    fn test_unrecognized_kind_skipped() {
        let daylight = record(
            DeviceKind::Other("Daylight".to_string()),
            DeviceState::default(),
        );
        assert_eq!(normalize(&daylight, TemperatureUnit::Celsius), None);
    }

    #[test]
    fn test_missing_state_field_skipped() {
        let empty = record(DeviceKind::Temperature, DeviceState::default());
        assert_eq!(normalize(&empty, TemperatureUnit::Celsius), None);
    }
}
