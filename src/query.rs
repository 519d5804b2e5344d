//! Query DSL codec: filter trees, requests and responses
//!
//! Pure transformations between the operator-facing JSON query text and
//! the wire shapes the backend expects. No network access and no
//! client-side validation beyond the shape itself; range defaults
//! (upper bound, limit, max skip) are applied by the backend.

use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, Result};
use crate::models::MetricRow;

/// Scalar operand of a comparison filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i64),
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

/// One node of the filter tree.
///
/// Leaves compare the JSON document at `path` against `value`;
/// composites combine their children. The `type` tag selects the
/// variant, so a leaf can never carry children and a composite never
/// carries a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Filter {
    Eq { path: String, value: FilterValue },
    Gte { path: String, value: FilterValue },
    Gt { path: String, value: FilterValue },
    Lte { path: String, value: FilterValue },
    Lt { path: String, value: FilterValue },
    And { children: Vec<Filter> },
    Or { children: Vec<Filter> },
}

/// Result ordering for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Body of `POST /query/{type}`.
///
/// Absent optional fields are omitted from the wire body and take the
/// backend defaults (upper = i64::MAX, limit = 1000, max_skip = 1000).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub metric_keys: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Lower time bound, nanoseconds since epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<i64>,
    /// Upper time bound, nanoseconds since epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl QueryRequest {
    /// Parse operator query text into a request.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ConsoleError::InvalidQuery(e.to_string()))
    }

    /// Serialize to the compact wire body.
    pub fn to_wire(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ConsoleError::Decode(e.to_string()))
    }
}

/// Body of a query response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Absent on the wire decodes as empty.
    #[serde(default)]
    pub rows: Vec<MetricRow>,
    /// Present only when results were truncated; absence means
    /// end-of-results, never "cursor zero".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_time_ns: Option<i64>,
}

impl QueryResponse {
    /// Decode a backend response body. `{}` is a valid empty result.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ConsoleError::Decode(e.to_string()))
    }
}

/// Re-serialize operator query text with stable two-space indentation.
///
/// Formats the raw JSON document rather than the typed request, so
/// fields the console does not know about pass through untouched (the
/// backend ignores them). On parse failure the error is returned and
/// the caller's draft must be left untouched. Running the formatter
/// over its own output is a no-op.
pub fn format_query_text(text: &str) -> Result<String> {
    let document: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ConsoleError::InvalidQuery(e.to_string()))?;
    serde_json::to_string_pretty(&document).map_err(|e| ConsoleError::InvalidQuery(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_four_request() -> QueryRequest {
        QueryRequest {
            metric_keys: vec!["cpu".to_string(), "mem".to_string()],
            filters: vec![Filter::And {
                children: vec![
                    Filter::Gte {
                        path: "load".to_string(),
                        value: FilterValue::Int(10),
                    },
                    Filter::Or {
                        children: vec![
                            Filter::Eq {
                                path: "host".to_string(),
                                value: FilterValue::Text("db-1".to_string()),
                            },
                            Filter::And {
                                children: vec![Filter::Lt {
                                    path: "latency".to_string(),
                                    value: FilterValue::Int(500),
                                }],
                            },
                        ],
                    },
                ],
            }],
            lower: Some(1_000_000_000),
            upper: Some(2_000_000_000),
            sort: Some(SortOrder::Desc),
            limit: Some(100),
            max_skip: None,
            cursor: Some("1500000000,3".to_string()),
        }
    }

    #[test]
    fn request_round_trips_through_json() {
        let request = depth_four_request();
        let wire = request.to_wire().unwrap();
        let reparsed = QueryRequest::from_json(&wire).unwrap();
        assert_eq!(reparsed, request);

        // and once more through the formatter
        let formatted = format_query_text(&wire).unwrap();
        assert_eq!(QueryRequest::from_json(&formatted).unwrap(), request);
    }

    #[test]
    fn filter_tags_on_the_wire() {
        let leaf = Filter::Eq {
            path: "host".to_string(),
            value: "db-1".into(),
        };
        let encoded = serde_json::to_value(&leaf).unwrap();
        assert_eq!(encoded["type"], "eq");
        assert_eq!(encoded["path"], "host");
        assert!(encoded.get("children").is_none());

        let composite = Filter::And { children: vec![leaf] };
        let encoded = serde_json::to_value(&composite).unwrap();
        assert_eq!(encoded["type"], "and");
        assert_eq!(encoded["children"].as_array().unwrap().len(), 1);
        assert!(encoded.get("path").is_none());
    }

    #[test]
    fn filter_value_accepts_int_and_string() {
        let int: FilterValue = serde_json::from_str("42").unwrap();
        assert_eq!(int, FilterValue::Int(42));

        let text: FilterValue = serde_json::from_str(r#""up""#).unwrap();
        assert_eq!(text, FilterValue::Text("up".to_string()));
    }

    #[test]
    fn empty_response_decodes_to_empty_rows() {
        let response = QueryResponse::from_json("{}").unwrap();
        assert!(response.rows.is_empty());
        assert_eq!(response.cursor, None);
        assert_eq!(response.query_time_ns, None);
    }

    #[test]
    fn absent_cursor_is_not_zero() {
        let response =
            QueryResponse::from_json(r#"{"rows":[],"query_time_ns":500000}"#).unwrap();
        assert_eq!(response.cursor, None);
        assert_eq!(response.query_time_ns, Some(500_000));
    }

    #[test]
    fn minimal_query_text_parses() {
        let request = QueryRequest::from_json("{\n  \"filters\": []\n}").unwrap();
        assert!(request.metric_keys.is_empty());
        assert!(request.filters.is_empty());
        assert_eq!(request.limit, None);
    }

    #[test]
    fn format_is_idempotent() {
        let once = format_query_text(r#"{"filters":[],"metric_keys":["cpu"]}"#).unwrap();
        let twice = format_query_text(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn format_preserves_unknown_fields() {
        let formatted =
            format_query_text(r#"{"filters":[],"metric_keys":["cpu"],"comment":"staging"}"#)
                .unwrap();
        assert!(formatted.contains("\"comment\""));
        assert!(formatted.contains("\"staging\""));
        // still parses as a request; the backend ignores the extras
        assert!(QueryRequest::from_json(&formatted).is_ok());
    }

    #[test]
    fn format_rejects_invalid_json() {
        let err = format_query_text("{not json").unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidQuery(_)));
    }

    #[test]
    fn absent_optionals_are_omitted_from_wire() {
        let wire = QueryRequest {
            metric_keys: vec!["cpu".to_string()],
            ..Default::default()
        }
        .to_wire()
        .unwrap();
        assert!(!wire.contains("lower"));
        assert!(!wire.contains("cursor"));
        assert!(!wire.contains("sort"));
    }
}
