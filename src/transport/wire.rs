//! Backend wire formats
//!
//! The backend stores the click tally and the cursor samples as JSON text
//! columns, so both travel as JSON-encoded strings inside the JSON body.

use crate::collector::types::{ButtonClickTally, MetricsSnapshot, Sample};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Failed to encode {field}: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode {field}: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type WireResult<T> = Result<T, WireError>;

/// Request body for `POST /behavior-metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSnapshot {
    /// Zero until the session is correlated with a submitted lead
    pub application_id: i64,
    pub time_on_page: f64,
    pub buttons_clicked: String,
    pub cursor_positions: String,
    pub return_frequency: u32,
    pub page_views: u32,
    pub scroll_depth: f64,
}

impl WireSnapshot {
    pub fn encode(snapshot: &MetricsSnapshot) -> WireResult<Self> {
        Ok(Self {
            application_id: snapshot.application_id.unwrap_or(0),
            time_on_page: snapshot.time_on_page_seconds,
            buttons_clicked: encode_field("buttons_clicked", &snapshot.buttons_clicked)?,
            cursor_positions: encode_field("cursor_positions", &snapshot.cursor_positions)?,
            return_frequency: snapshot.return_frequency,
            page_views: snapshot.page_views,
            scroll_depth: snapshot.scroll_depth,
        })
    }

    /// Parse the nested string fields back into a snapshot. An `application_id` of 0 reads as unbound.
    pub fn decode(&self) -> WireResult<MetricsSnapshot> {
        Ok(MetricsSnapshot {
            application_id: Some(self.application_id).filter(|id| *id != 0),
            time_on_page_seconds: self.time_on_page,
            buttons_clicked: decode_tally(&self.buttons_clicked)?,
            cursor_positions: serde_json::from_str(&self.cursor_positions).map_err(|source| {
                WireError::Decode {
                    field: "cursor_positions",
                    source,
                }
            })?,
            return_frequency: self.return_frequency,
            page_views: self.page_views,
            scroll_depth: self.scroll_depth,
        })
    }

    pub fn to_json(&self) -> WireResult<String> {
        serde_json::to_string(self).map_err(|source| WireError::Encode {
            field: "body",
            source,
        })
    }

    pub fn from_json(body: &str) -> WireResult<Self> {
        serde_json::from_str(body).map_err(|source| WireError::Decode {
            field: "body",
            source,
        })
    }
}

impl TryFrom<&MetricsSnapshot> for WireSnapshot {
    type Error = WireError;

    fn try_from(snapshot: &MetricsSnapshot) -> WireResult<Self> {
        Self::encode(snapshot)
    }
}

fn encode_field<T: Serialize>(field: &'static str, value: &T) -> WireResult<String> {
    serde_json::to_string(value).map_err(|source| WireError::Encode { field, source })
}

/// Click entry written by older clients, which sent one entry per click.
#[derive(Debug, Deserialize)]
struct ClickEntry {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TallyRepr {
    Tally(ButtonClickTally),
    Entries(Vec<ClickEntry>),
}

/// Decode a `buttons_clicked` string, accepting both the tally map and the per-click list.
pub fn decode_tally(raw: &str) -> WireResult<ButtonClickTally> {
    let repr: TallyRepr = serde_json::from_str(raw).map_err(|source| WireError::Decode {
        field: "buttons_clicked",
        source,
    })?;

    Ok(match repr {
        TallyRepr::Tally(tally) => tally,
        TallyRepr::Entries(entries) => {
            let mut tally = ButtonClickTally::new();
            for entry in entries {
                let label = entry
                    .text
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(crate::collector::target::FALLBACK_LABEL);
                *tally.entry(label.to_string()).or_insert(0) += 1;
            }
            tally
        }
    })
}

/// Cursor sample as returned by query endpoints, where any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl RawSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            timestamp: None,
        }
    }
}

impl From<Sample> for RawSample {
    fn from(sample: Sample) -> Self {
        Self {
            x: Some(sample.x),
            y: Some(sample.y),
            timestamp: Some(sample.timestamp),
        }
    }
}

/// Record returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMetrics {
    pub id: i64,
    #[serde(default)]
    pub application_id: Option<i64>,
    pub time_on_page: f64,
    #[serde(default)]
    pub buttons_clicked: Option<String>,
    #[serde(default)]
    pub cursor_positions: Option<String>,
    pub return_frequency: u32,
    pub page_views: u32,
    pub scroll_depth: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredMetrics {
    pub fn button_tally(&self) -> WireResult<ButtonClickTally> {
        match self.buttons_clicked.as_deref() {
            Some(raw) if !raw.is_empty() => decode_tally(raw),
            _ => Ok(ButtonClickTally::new()),
        }
    }

    pub fn cursor_samples(&self) -> WireResult<Vec<RawSample>> {
        match self.cursor_positions.as_deref() {
            Some(raw) if !raw.is_empty() => {
                serde_json::from_str(raw).map_err(|source| WireError::Decode {
                    field: "cursor_positions",
                    source,
                })
            }
            _ => Ok(Vec::new()),
        }
    }
}

/// Partial update body for `PUT /behavior-metrics/...`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_on_page: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons_clicked: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_positions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_views: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_depth: Option<f64>,
}

impl From<WireSnapshot> for MetricsUpdate {
    fn from(wire: WireSnapshot) -> Self {
        Self {
            time_on_page: Some(wire.time_on_page),
            buttons_clicked: Some(wire.buttons_clicked),
            cursor_positions: Some(wire.cursor_positions),
            return_frequency: Some(wire.return_frequency),
            page_views: Some(wire.page_views),
            scroll_depth: Some(wire.scroll_depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> MetricsSnapshot {
        let mut buttons_clicked = ButtonClickTally::new();
        buttons_clicked.insert("Send".to_string(), 2);
        buttons_clicked.insert("Email".to_string(), 1);

        MetricsSnapshot {
            application_id: Some(17),
            time_on_page_seconds: 42.25,
            buttons_clicked,
            cursor_positions: vec![
                Sample { x: 10.0, y: 20.0, timestamp: 1_700_000_000_000 },
                Sample { x: 11.5, y: 19.0, timestamp: 1_700_000_001_000 },
            ],
            return_frequency: 1,
            page_views: 2,
            scroll_depth: 0.75,
        }
    }

    #[test]
    fn test_body_uses_snake_case_and_nested_strings() {
        let wire = WireSnapshot::encode(&snapshot()).unwrap();
        let body: serde_json::Value = serde_json::from_str(&wire.to_json().unwrap()).unwrap();

        assert_eq!(body["application_id"], 17);
        assert_eq!(body["time_on_page"], 42.25);
        assert_eq!(body["page_views"], 2);
        assert_eq!(body["return_frequency"], 1);
        assert!(body["buttons_clicked"].is_string());
        assert!(body["cursor_positions"].is_string());

        let tally: serde_json::Value =
            serde_json::from_str(body["buttons_clicked"].as_str().unwrap()).unwrap();
        assert_eq!(tally["Send"], 2);
    }

    #[test]
    fn test_round_trip_through_json_body() {
        let original = snapshot();
        let body = WireSnapshot::encode(&original).unwrap().to_json().unwrap();
        let decoded = WireSnapshot::from_json(&body).unwrap().decode().unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_unbound_application_id_is_zero() {
        let mut unbound = snapshot();
        unbound.application_id = None;

        let wire = WireSnapshot::encode(&unbound).unwrap();
        assert_eq!(wire.application_id, 0);
        assert_eq!(wire.decode().unwrap().application_id, None);
    }

    #[test]
    fn test_decode_legacy_click_list() {
        let raw = r#"[{"text":"Send","timestamp":1},{"text":" Send ","timestamp":2},{"text":null,"timestamp":3}]"#;
        let tally = decode_tally(raw).unwrap();
        assert_eq!(tally["Send"], 2);
        assert_eq!(tally["unknown"], 1);
    }

    #[test]
    fn test_malformed_nested_field() {
        let mut wire = WireSnapshot::encode(&snapshot()).unwrap();
        wire.cursor_positions = "not json".to_string();

        let err = wire.decode().unwrap_err();
        assert!(matches!(err, WireError::Decode { field: "cursor_positions", .. }));
    }

    #[test]
    fn test_stored_record_with_nulls() {
        let json = r#"{
            "id": 3,
            "application_id": null,
            "time_on_page": 12.0,
            "buttons_clicked": null,
            "cursor_positions": "[{\"x\": 5, \"y\": 6, \"timestamp\": 7}, {\"x\": 1}]",
            "return_frequency": 0,
            "page_views": 1,
            "scroll_depth": 0.3,
            "created_at": "2026-10-01T12:00:00Z"
        }"#;

        let stored: StoredMetrics = serde_json::from_str(json).unwrap();
        assert!(stored.button_tally().unwrap().is_empty());
        assert!(stored.updated_at.is_none());

        let samples = stored.cursor_samples().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], RawSample { x: Some(5.0), y: Some(6.0), timestamp: Some(7) });
        assert_eq!(samples[1].y, None);
    }

    #[test]
    fn test_update_omits_absent_fields() {
        let update = MetricsUpdate {
            scroll_depth: Some(0.9),
            ..MetricsUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "scroll_depth": 0.9 }));
    }
}
