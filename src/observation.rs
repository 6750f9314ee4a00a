//! Observation decoding.
//!
//! The actor serializes its state every frame and payloads may arrive
//! truncated or garbled. Decoding therefore never fails: every field goes
//! through [`parse_or_default`], and an unparsable payload decodes to
//! [`Observation::default`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point in level space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// The typed fields the orchestrator reads from a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub position: Vec3,
    /// Heading in degrees.
    pub yaw: f64,
    pub goal_found: u32,
    pub goal_total: u32,
}

/// Apply `parse` to `value` when present, falling back to `T::default()`.
pub fn parse_or_default<T, F>(value: Option<&Value>, parse: F) -> T
where
    T: Default,
    F: FnOnce(&Value) -> Option<T>,
{
    value.and_then(parse).unwrap_or_default()
}

fn finite_f64(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn counter(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return Some(u32::try_from(n).unwrap_or(u32::MAX));
    }
    value
        .as_f64()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.trunc().min(f64::from(u32::MAX)) as u32)
}

fn position(value: &Value) -> Option<Vec3> {
    match value {
        Value::Object(map) => Some(Vec3 {
            x: parse_or_default(map.get("x"), finite_f64),
            y: parse_or_default(map.get("y"), finite_f64),
            z: parse_or_default(map.get("z"), finite_f64),
        }),
        Value::Array(items) => Some(Vec3 {
            x: parse_or_default(items.first(), finite_f64),
            y: parse_or_default(items.get(1), finite_f64),
            z: parse_or_default(items.get(2), finite_f64),
        }),
        _ => None,
    }
}

impl Observation {
    /// Decode a raw payload. Never fails.
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::default(),
        }
    }

    /// Decode an already-parsed JSON value. Non-object values yield the default.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        Self {
            position: parse_or_default(map.get("position"), position),
            yaw: parse_or_default(map.get("yaw"), finite_f64),
            goal_found: parse_or_default(
                map.get("goalFound").or_else(|| map.get("goal_found")),
                counter,
            ),
            goal_total: parse_or_default(
                map.get("goalTotal").or_else(|| map.get("goal_total")),
                counter,
            ),
        }
    }

    /// Encode in the canonical wire shape the actor uses.
    pub fn to_payload(&self) -> String {
        serde_json::json!({
            "position": { "x": self.position.x, "y": self.position.y, "z": self.position.z },
            "yaw": self.yaw,
            "goalFound": self.goal_found,
            "goalTotal": self.goal_total,
        })
        .to_string()
    }
}
