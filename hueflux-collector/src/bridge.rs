//! Hub API client and raw device model.
//!
//! The hub exposes its current state over a local REST API:
//! `GET http://<host>/api/<user>/sensors` and `.../lights`, each returning
//! a JSON object keyed by device id. API-level failures (e.g. an
//! unauthorized user) come back as a JSON array carrying an `error`
//! object, with HTTP status 200, so they are detected by shape rather
//! than status.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use hueflux_common::{Error, Result};

/// Recognized device kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    /// Temperature sensor reporting hundredths of a degree Celsius.
    Temperature,
    /// Light-level sensor reporting a logarithmic lux encoding.
    LightLevel,
    /// Presence (motion) sensor.
    Presence,
    /// Light or smart plug with an on/off flag and optional brightness.
    Actuator,
    /// Anything else the hub reports (daylight schedules, generic CLIP
    /// sensors, ...). Skipped during normalization.
    Other(String),
}

impl DeviceKind {
    fn from_type(kind: &str) -> Self {
        match kind {
            "ZLLTemperature" | "CLIPTemperature" => DeviceKind::Temperature,
            "ZLLLightLevel" | "CLIPLightLevel" => DeviceKind::LightLevel,
            "ZLLPresence" | "CLIPPresence" => DeviceKind::Presence,
            other => DeviceKind::Other(other.to_string()),
        }
    }
}

/// Kind-specific state payload. All fields optional; which ones are
/// present depends on the device kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceState {
    /// Hundredths of a degree Celsius.
    pub temperature: Option<i64>,

    /// Logarithmic lux encoding.
    pub lightlevel: Option<i64>,

    /// Presence detected.
    pub presence: Option<bool>,

    /// Actuator power state.
    pub on: Option<bool>,

    /// Brightness, 0-254. Absent on pure on/off actuators.
    pub bri: Option<u8>,
}

/// One device from a hub snapshot. Produced fresh each poll and discarded
/// after normalization.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub id: String,
    pub name: String,
    pub kind: DeviceKind,
    pub state: DeviceState,
}

/// Wire shape shared by both hub categories.
#[derive(Debug, Deserialize)]
struct RawDevice {
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    state: DeviceState,
}

/// Client for the hub's REST API.
pub struct HubClient {
    http: reqwest::Client,
    base: String,
}

impl HubClient {
    /// Create a client for the given hub.
    pub fn new(host: &str, user: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base: format!("http://{}/api/{}", host, user),
        })
    }

    /// Fetch the current state of all devices, both sensors and lights.
    pub async fn fetch_devices(&self) -> Result<Vec<DeviceRecord>> {
        let sensors = self.get_json("sensors").await?;
        let lights = self.get_json("lights").await?;
        decode_devices(&sensors, &lights)
    }

    /// Fetch both categories as raw JSON, for the dump mode.
    pub async fn fetch_raw(&self) -> Result<serde_json::Value> {
        let sensors = self.get_json("sensors").await?;
        let lights = self.get_json("lights").await?;
        Ok(serde_json::json!({ "sensors": sensors, "lights": lights }))
    }

    async fn get_json(&self, category: &str) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base, category);
        let response = self.http.get(&url).send().await?.error_for_status()?;
        let json: serde_json::Value = response.json().await?;

        if let Some(description) = api_error(&json) {
            return Err(Error::Hub(description));
        }

        Ok(json)
    }
}

/// Decode the two category payloads into one device list.
///
/// Lights carry no sensor type discriminator; everything from the lights
/// category is an actuator. Device ids iterate in sorted order so a poll
/// decodes deterministically.
pub fn decode_devices(
    sensors: &serde_json::Value,
    lights: &serde_json::Value,
) -> Result<Vec<DeviceRecord>> {
    let sensors: BTreeMap<String, RawDevice> = serde_json::from_value(sensors.clone())?;
    let lights: BTreeMap<String, RawDevice> = serde_json::from_value(lights.clone())?;

    let mut records = Vec::with_capacity(sensors.len() + lights.len());

    for (id, raw) in sensors {
        records.push(DeviceRecord {
            id,
            kind: DeviceKind::from_type(&raw.kind),
            name: raw.name,
            state: raw.state,
        });
    }
    for (id, raw) in lights {
        records.push(DeviceRecord {
            id,
            kind: DeviceKind::Actuator,
            name: raw.name,
            state: raw.state,
        });
    }

    Ok(records)
}

/// Extract the description from a hub API error response, if the payload
/// is one.
fn api_error(json: &serde_json::Value) -> Option<String> {
    let entries = json.as_array()?;
    entries.iter().find_map(|entry| {
        let error = entry.get("error")?;
        Some(
            error
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("unknown hub error")
                .to_string(),
        )
    })
}
