//! # Phone Sync
//!
//! The phone publishes the forecast as a small key/value data item under a fixed
//! path. The transport is owned by the host; this module defines what arrives
//! over it and how a batch of events turns into weather updates.
//!
//! ## Payload
//! | key         | type    | meaning                          |
//! |-------------|---------|----------------------------------|
//! | `high`      | string  | formatted forecast high          |
//! | `low`       | string  | formatted forecast low           |
//! | `weatherId` | integer | OpenWeatherMap condition code    |
//!
//! Every key is optional. Only `changed` events on the weather path are acted
//! on; deletions and other paths are ignored.
//!
//! ## Event Feed Format
//! Desktop runs replay events from JSON:
//! ```json
//! [{ "type": "changed", "path": "/weather-data",
//!    "data": { "high": "75°", "low": "60°", "weatherId": 800 } }]
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::weather::WeatherUpdate;

/// Path the phone publishes weather data under.
pub const WEATHER_PATH: &str = "/weather-data";
pub const KEY_HIGH: &str = "high";
pub const KEY_LOW: &str = "low";
pub const KEY_WEATHER_ID: &str = "weatherId";

#[derive(Error, Debug)]
pub enum SyncError {
    /// A payload field holds a value of the wrong type
    #[error("field `{key}` is a {found}, expected {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A condition code that does not fit the display's integer range
    #[error("weather id {0} is out of range")]
    IdOutOfRange(i64),

    /// The replayed event feed could not be decoded
    #[error("malformed event feed: {0}")]
    Feed(#[from] serde_json::Error),
}

/// A single value in a data item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl DataValue {
    fn type_name(&self) -> &'static str {
        match self {
            DataValue::Bool(_) => "bool",
            DataValue::Int(_) => "integer",
            DataValue::Float(_) => "float",
            DataValue::Text(_) => "string",
        }
    }
}

pub type DataMap = BTreeMap<String, DataValue>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataEventKind {
    Changed,
    Deleted,
}

/// One change notification from the sync channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataEvent {
    #[serde(rename = "type")]
    pub kind: DataEventKind,
    pub path: String,
    #[serde(default)]
    pub data: DataMap,
}

impl DataEvent {
    pub fn changed(path: impl Into<String>, data: DataMap) -> Self {
        Self {
            kind: DataEventKind::Changed,
            path: path.into(),
            data,
        }
    }
}

/// Decode a JSON array of events.
pub fn parse_events(json: &str) -> Result<Vec<DataEvent>, SyncError> {
    Ok(serde_json::from_str(json)?)
}

/// The host's cross-device data channel.
///
/// Connection results come back to the face asynchronously through
/// `WatchFaceEngine::on_connected` and friends.
pub trait SyncChannel {
    fn connect(&mut self);
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    /// Start delivering data events to the face.
    fn add_listener(&mut self);
    fn remove_listener(&mut self);
}

/// In-process channel that connects immediately.
///
/// Tracks connection and listener state only; the owner delivers events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopbackChannel {
    connected: bool,
    listening: bool,
}

impl LoopbackChannel {
    /// Whether events should currently be delivered.
    pub fn is_listening(&self) -> bool {
        self.connected && self.listening
    }
}

impl SyncChannel for LoopbackChannel {
    fn connect(&mut self) {
        self.connected = true;
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.listening = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn add_listener(&mut self) {
        self.listening = true;
    }

    fn remove_listener(&mut self) {
        self.listening = false;
    }
}

fn string_field(map: &DataMap, key: &'static str) -> Result<Option<String>, SyncError> {
    match map.get(key) {
        None => Ok(None),
        Some(DataValue::Text(text)) => Ok(Some(text.clone())),
        Some(other) => Err(SyncError::WrongType {
            key,
            expected: "string",
            found: other.type_name(),
        }),
    }
}

fn int_field(map: &DataMap, key: &'static str) -> Result<Option<i32>, SyncError> {
    match map.get(key) {
        None => Ok(None),
        Some(DataValue::Int(value)) => i32::try_from(*value)
            .map(Some)
            .map_err(|_| SyncError::IdOutOfRange(*value)),
        Some(other) => Err(SyncError::WrongType {
            key,
            expected: "integer",
            found: other.type_name(),
        }),
    }
}

/// Extract the weather fields from a data item.
///
/// A field of the wrong type is logged and skipped; the others still apply.
pub fn weather_update_from(map: &DataMap) -> WeatherUpdate {
    fn keep<T>(field: Result<Option<T>, SyncError>) -> Option<T> {
        field.unwrap_or_else(|e| {
            warn!("ignoring weather field: {e}");
            None
        })
    }

    WeatherUpdate {
        high: keep(string_field(map, KEY_HIGH)),
        low: keep(string_field(map, KEY_LOW)),
        condition_id: keep(int_field(map, KEY_WEATHER_ID)),
    }
}

/// Filters data events down to weather updates.
#[derive(Clone, Debug)]
pub struct WeatherSyncListener {
    path: String,
}

impl Default for WeatherSyncListener {
    fn default() -> Self {
        Self::new(WEATHER_PATH)
    }
}

impl WeatherSyncListener {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// One update per `changed` event on the weather path, in delivery order.
    pub fn updates<'a>(
        &'a self,
        events: &'a [DataEvent],
    ) -> impl Iterator<Item = WeatherUpdate> + 'a {
        events
            .iter()
            .filter(|event| event.kind == DataEventKind::Changed)
            .filter(move |event| {
                debug!("data changed at {}", event.path);
                event.path == self.path
            })
            .map(|event| weather_update_from(&event.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_map(entries: &[(&str, DataValue)]) -> DataMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_parse_event_feed() {
        let json = r#"[
            {"type": "changed", "path": "/weather-data",
             "data": {"high": "75°", "low": "60°", "weatherId": 200}},
            {"type": "deleted", "path": "/weather-data"}
        ]"#;
        let events = parse_events(json).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, DataEventKind::Changed);
        assert_eq!(events[0].data.get("weatherId"), Some(&DataValue::Int(200)));
        assert_eq!(events[1].kind, DataEventKind::Deleted);
        assert!(events[1].data.is_empty());
    }

    #[test]
    fn test_malformed_feed_is_an_error() {
        assert!(matches!(parse_events("{"), Err(SyncError::Feed(_))));
        assert!(parse_events(r#"[{"type": "moved", "path": "/x"}]"#).is_err());
    }

    #[test]
    fn test_only_changed_events_on_weather_path() {
        let data = weather_map(&[("high", DataValue::Text("75°".into()))]);
        let events = vec![
            DataEvent::changed("/other", data.clone()),
            DataEvent {
                kind: DataEventKind::Deleted,
                path: WEATHER_PATH.to_string(),
                data: data.clone(),
            },
            DataEvent::changed(WEATHER_PATH, data),
        ];

        let listener = WeatherSyncListener::default();
        let updates: Vec<_> = listener.updates(&events).collect();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].high.as_deref(), Some("75°"));
        assert_eq!(updates[0].low, None);
    }

    #[test]
    fn test_wrong_types_are_skipped() {
        let map = weather_map(&[
            ("high", DataValue::Int(75)),
            ("low", DataValue::Text("60°".into())),
            ("weatherId", DataValue::Text("800".into())),
        ]);
        let update = weather_update_from(&map);

        assert_eq!(update.high, None);
        assert_eq!(update.low.as_deref(), Some("60°"));
        assert_eq!(update.condition_id, None);
    }

    #[test]
    fn test_out_of_range_weather_id() {
        let map = weather_map(&[("weatherId", DataValue::Int(i64::MAX))]);
        assert!(matches!(
            int_field(&map, KEY_WEATHER_ID),
            Err(SyncError::IdOutOfRange(_))
        ));
        assert!(weather_update_from(&map).is_empty());
    }

    #[test]
    fn test_loopback_channel_listens_only_while_connected() {
        let mut channel = LoopbackChannel::default();
        channel.add_listener();
        assert!(!channel.is_listening());

        channel.connect();
        channel.add_listener();
        assert!(channel.is_listening());

        channel.disconnect();
        assert!(!channel.is_connected());
        assert!(!channel.is_listening());
    }
}
