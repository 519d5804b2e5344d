//! Core domain models for the SushiDB console

use serde::{Deserialize, Serialize};

/// The two kinds of metric SushiDB stores.
///
/// Branching on the metric type is always an exhaustive match, so a
/// third kind becomes a compile-time checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Scalar value per sample
    Single,
    /// Structured JSON payload per sample
    Message,
}

impl MetricType {
    /// Wire/path representation of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Single => "single",
            MetricType::Message => "message",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricType {
    type Err = crate::error::ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(MetricType::Single),
            "message" => Ok(MetricType::Message),
            other => Err(crate::error::ConsoleError::Config(format!(
                "unknown metric type '{}', expected 'single' or 'message'",
                other
            ))),
        }
    }
}

/// Identity of one stored time series, as returned by `GET /keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricKey {
    pub metric_id: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
}

impl MetricKey {
    pub fn new(metric_id: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            metric_id: metric_id.into(),
            metric_type,
        }
    }

    /// Navigation target for viewing this metric's rows.
    pub fn view_path(&self) -> String {
        match self.metric_type {
            MetricType::Single => format!("/metric/single/{}", self.metric_id),
            MetricType::Message => format!("/metric/message/{}", self.metric_id),
        }
    }

    /// Navigation target for querying this metric.
    pub fn query_path(&self) -> String {
        match self.metric_type {
            MetricType::Single => format!("/query/single/{}", self.metric_id),
            MetricType::Message => format!("/query/message/{}", self.metric_id),
        }
    }
}

/// One stored sample.
///
/// `value` is a number for single metrics and an arbitrary JSON
/// document for message metrics. `metric_key` is only present when a
/// query spans multiple keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Nanoseconds since the Unix epoch
    pub time: i64,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_key: Option<String>,
}

/// Response body of `GET /metric/{type}/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricResponse {
    /// Absent on the wire decodes as empty, never as an error.
    #[serde(default)]
    pub rows: Vec<MetricRow>,
}

/// Response body of `GET /pd/api/v1/stores`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreListResponse {
    #[serde(default)]
    pub stores: Vec<StoreStatus>,
}

/// Polled snapshot of one storage node. Read-only; the console never
/// mutates cluster state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub store: Store,
    pub status: StoreRuntimeStatus,
}

/// Static identity of a storage node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub state_name: String,
}

/// Runtime counters reported by the placement driver for one store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreRuntimeStatus {
    #[serde(default)]
    pub available: String,
    #[serde(default)]
    pub capacity: String,
    #[serde(default)]
    pub leader_weight: f64,
    #[serde(default)]
    pub region_count: u64,
    #[serde(default)]
    pub region_weight: f64,
    #[serde(default)]
    pub region_score: f64,
    #[serde(default)]
    pub region_size: u64,
    #[serde(default)]
    pub start_ts: String,
    #[serde(default)]
    pub last_heartbeat_ts: String,
    #[serde(default)]
    pub uptime: String,
}

impl StoreStatus {
    /// `available / capacity` disk summary line.
    pub fn disk_summary(&self) -> String {
        format!("{} / {}", self.status.available, self.status.capacity)
    }

    /// Region placement summary line.
    pub fn region_summary(&self) -> String {
        format!(
            "count: {} / weight: {} / score: {} / size: {}",
            self.status.region_count,
            self.status.region_weight,
            self.status.region_score,
            self.status.region_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_path_branches_on_type() {
        let single = MetricKey::new("cpu", MetricType::Single);
        let message = MetricKey::new("access-log", MetricType::Message);

        assert!(single.view_path().contains("metric/single/"));
        assert!(message.view_path().contains("metric/message/"));
        assert_eq!(single.view_path(), "/metric/single/cpu");
        assert_eq!(message.view_path(), "/metric/message/access-log");
    }

    #[test]
    fn query_path_branches_on_type() {
        let single = MetricKey::new("cpu", MetricType::Single);
        let message = MetricKey::new("access-log", MetricType::Message);

        assert!(single.query_path().contains("query/single/"));
        assert!(message.query_path().contains("query/message/"));
        assert_eq!(single.query_path(), "/query/single/cpu");
    }

    #[test]
    fn metric_key_uses_type_field_on_the_wire() {
        let key: MetricKey = serde_json::from_str(r#"{"metric_id":"cpu","type":"single"}"#).unwrap();
        assert_eq!(key, MetricKey::new("cpu", MetricType::Single));

        let encoded = serde_json::to_value(&key).unwrap();
        assert_eq!(encoded["type"], "single");
    }

    #[test]
    fn metric_response_tolerates_missing_rows() {
        let response: MetricResponse = serde_json::from_str("{}").unwrap();
        assert!(response.rows.is_empty());
    }

    #[test]
    fn store_status_summaries() {
        let info: StoreStatus = serde_json::from_str(
            r#"{
                "store": {"id": 1, "address": "127.0.0.1:20160", "version": "2.1.0", "state_name": "Up"},
                "status": {
                    "available": "18 GiB", "capacity": "20 GiB",
                    "leader_weight": 1.0,
                    "region_count": 12, "region_weight": 1.0,
                    "region_score": 12.0, "region_size": 34,
                    "start_ts": "2019-01-01T00:00:00Z",
                    "last_heartbeat_ts": "2019-01-01T01:00:00Z",
                    "uptime": "1h0m0s"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(info.disk_summary(), "18 GiB / 20 GiB");
        assert_eq!(info.region_summary(), "count: 12 / weight: 1 / score: 12 / size: 34");
    }
}
