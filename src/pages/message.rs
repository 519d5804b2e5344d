//! Message metric view: structured JSON rows for one metric key

use crate::api::{ApiClient, FetchOptions};
use crate::display::format_time_ns;
use crate::models::{MetricResponse, MetricType};
use crate::resource::{Resource, ResourceState};

/// One rendered table row; the value is pretty-printed JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub metric_id: String,
    pub time: String,
    pub value_json: String,
}

/// Controller for the message metric view, keyed by metric id.
pub struct MessageMetricController {
    rows: Resource<MetricResponse, String>,
}

impl MessageMetricController {
    /// Bind to one metric id and perform the initial fetch.
    pub async fn bind(api: ApiClient, metric_id: impl Into<String>) -> Self {
        let rows = Resource::bind(
            metric_id.into(),
            MetricResponse::default(),
            move |metric_id: String| {
                let api = api.clone();
                async move {
                    api.metric_rows(MetricType::Message, &metric_id, &FetchOptions::default())
                        .await
                }
            },
        )
        .await;
        Self { rows }
    }

    /// Point the view at a different metric.
    pub async fn select_metric(&self, metric_id: impl Into<String>) {
        self.rows.set_deps(metric_id.into()).await;
    }

    pub fn metric_id(&self) -> String {
        self.rows.deps()
    }

    pub fn state(&self) -> ResourceState<MetricResponse> {
        self.rows.snapshot()
    }

    pub async fn refresh(&self) {
        self.rows.refresh().await;
    }

    /// Table rows with formatted timestamps and JSON payloads.
    pub fn table_rows(&self) -> Vec<MessageRow> {
        let metric_id = self.metric_id();
        self.rows
            .body()
            .rows
            .into_iter()
            .map(|row| MessageRow {
                metric_id: metric_id.clone(),
                time: format_time_ns(row.time),
                value_json: serde_json::to_string_pretty(&row.value)
                    .unwrap_or_else(|_| row.value.to_string()),
            })
            .collect()
    }
}
