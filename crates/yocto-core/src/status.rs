//! Printer host status snapshots.
//!
//! A [`StatusSnapshot`] is whatever JSON object the host returned from
//! `GET /api/status`, plus the client-side `host_connected` flag. Fields the
//! client does not know about are carried through untouched, so the snapshot
//! wraps a JSON map instead of a fixed struct and exposes typed accessors for
//! the fields the client reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Field set by the client to record that the host answered.
pub const HOST_CONNECTED: &str = "host_connected";
/// Whether the host has a printer attached.
pub const PRINTER_CONNECTED: &str = "printer_connected";
/// Measured temperatures, one entry per probe.
pub const TEMPERATURES: &str = "temperatures";
/// Whether manual jogging is currently allowed.
pub const MANUAL_CONTROL_ENABLED: &str = "manual_control_enabled";
/// Fan speeds, one entry per fan.
pub const FAN_SPEED: &str = "fan_speed";

/// Last known state of the printer host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot(Map<String, Value>);

impl StatusSnapshot {
    /// The snapshot published before the first answer and after every failure.
    ///
    /// All flags are false, `temperatures` is empty and `fan_speed` holds a
    /// single zero.
    pub fn default_status() -> Self {
        let mut map = Map::new();
        map.insert(HOST_CONNECTED.to_string(), Value::Bool(false));
        map.insert(PRINTER_CONNECTED.to_string(), Value::Bool(false));
        map.insert(TEMPERATURES.to_string(), json!([]));
        map.insert(MANUAL_CONTROL_ENABLED.to_string(), Value::Bool(false));
        map.insert(FAN_SPEED.to_string(), json!([0]));
        Self(map)
    }

    /// Wrap an arbitrary JSON value. Returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Force `host_connected` to `true`, replacing any value the host sent.
    pub fn mark_host_connected(mut self) -> Self {
        self.0.insert(HOST_CONNECTED.to_string(), Value::Bool(true));
        self
    }

    pub fn host_connected(&self) -> bool {
        self.bool_field(HOST_CONNECTED)
    }

    pub fn printer_connected(&self) -> bool {
        self.bool_field(PRINTER_CONNECTED)
    }

    pub fn manual_control_enabled(&self) -> bool {
        self.bool_field(MANUAL_CONTROL_ENABLED)
    }

    /// Temperatures reported by the host, for hosts that send plain numbers.
    ///
    /// Entries that are not numbers are dropped, so a host that reports one
    /// object per probe yields an empty list here. Read such payloads through
    /// [`get`](Self::get) with [`TEMPERATURES`].
    pub fn temperatures(&self) -> Vec<f64> {
        self.number_list(TEMPERATURES)
    }

    /// Fan speeds reported by the host. Non-numeric entries are skipped.
    pub fn fan_speed(&self) -> Vec<f64> {
        self.number_list(FAN_SPEED)
    }

    /// Raw access to any field, including ones the client does not model.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true if this snapshot is exactly the default status.
    pub fn is_default(&self) -> bool {
        *self == Self::default_status()
    }

    fn bool_field(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    fn number_list(&self, key: &str) -> Vec<f64> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default()
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::default_status()
    }
}

impl std::fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let temps = self
            .temperatures()
            .iter()
            .map(|t| format!("{t:.1}"))
            .collect::<Vec<_>>()
            .join("/");
        write!(
            f,
            "host={} printer={} manual={} temps=[{}] fans={:?}",
            self.host_connected(),
            self.printer_connected(),
            self.manual_control_enabled(),
            temps,
            self.fan_speed()
        )
    }
}
