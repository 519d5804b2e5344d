//! Single metric view: scalar rows for one metric key

use crate::api::{ApiClient, FetchOptions};
use crate::display::format_time_ns;
use crate::models::{MetricResponse, MetricRow, MetricType};
use crate::resource::{Resource, ResourceState};

/// One rendered table row.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleRow {
    pub metric_id: String,
    pub time: String,
    pub value: f64,
}

/// Controller for the single-value metric view, keyed by metric id.
pub struct SingleMetricController {
    rows: Resource<MetricResponse, String>,
}

impl SingleMetricController {
    /// Bind to one metric id and perform the initial fetch.
    pub async fn bind(api: ApiClient, metric_id: impl Into<String>) -> Self {
        let rows = Resource::bind(
            metric_id.into(),
            MetricResponse::default(),
            move |metric_id: String| {
                let api = api.clone();
                async move {
                    api.metric_rows(MetricType::Single, &metric_id, &FetchOptions::default())
                        .await
                }
            },
        )
        .await;
        Self { rows }
    }

    /// Point the view at a different metric. Resets the rows to empty
    /// and refetches; a no-op when the id is unchanged.
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

    /// Rows sorted by ascending time, for the chart.
    ///
    /// Works on a copy; the fetched rows keep their arrival order.
    pub fn sorted_rows(&self) -> Vec<MetricRow> {
        let mut rows = self.rows.body().rows;
        rows.sort_by_key(|row| row.time);
        rows
    }

    /// Table rows in arrival order with formatted timestamps.
    pub fn table_rows(&self) -> Vec<SingleRow> {
        let metric_id = self.metric_id();
        self.rows
            .body()
            .rows
            .into_iter()
            .map(|row| SingleRow {
                metric_id: metric_id.clone(),
                time: format_time_ns(row.time),
                value: row.value.as_f64().unwrap_or(f64::NAN),
            })
            .collect()
    }
}
