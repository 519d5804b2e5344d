//! Query view: editable JSON query against one metric

use parking_lot::Mutex;

use crate::api::ApiClient;
use crate::display::{format_query_time, format_time_ns};
use crate::error::{ConsoleError, Result};
use crate::models::MetricType;
use crate::query::{format_query_text, QueryRequest, QueryResponse};
use crate::resource::Resource;

/// Starting point shown in the editor.
pub const INITIAL_QUERY_TEXT: &str = "{\n  \"filters\": []\n}";

/// One result row of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRow {
    /// Key the row came from; falls back to the queried metric when the
    /// backend does not attach one.
    pub metric_key: String,
    pub time: String,
    pub time_ns: i64,
    pub value: serde_json::Value,
    pub value_json: String,
}

/// Renderable outcome of the last committed query.
#[derive(Debug, Clone)]
pub struct QueryViewModel {
    pub rows: Vec<QueryRow>,
    /// Present only when the result was truncated.
    pub cursor: Option<String>,
    /// Backend-side execution time, e.g. `0.5ms`.
    pub query_time: Option<String>,
    pub is_loading: bool,
    pub error: Option<ConsoleError>,
}

/// Controller for the ad-hoc query view.
///
/// Holds two pieces of text: the editable `draft` and the committed
/// query the binding depends on. Only `submit()` moves draft to
/// committed; editing the draft never refetches.
pub struct QueryController {
    metric_type: MetricType,
    metric_id: String,
    draft: Mutex<String>,
    results: Resource<QueryResponse, String>,
}

impl QueryController {
    /// Bind to one metric and run the initial (empty-filter) query.
    pub async fn bind(api: ApiClient, metric_type: MetricType, metric_id: impl Into<String>) -> Self {
        let metric_id = metric_id.into();
        let fetch_id = metric_id.clone();
        let results = Resource::bind(
            INITIAL_QUERY_TEXT.to_string(),
            QueryResponse::default(),
            move |committed: String| {
                let api = api.clone();
                let metric_id = fetch_id.clone();
                async move {
                    let mut request = QueryRequest::from_json(&committed)?;
                    if request.metric_keys.is_empty() {
                        request.metric_keys.push(metric_id);
                    }
                    api.query(metric_type, &request).await
                }
            },
        )
        .await;

        Self {
            metric_type,
            metric_id,
            draft: Mutex::new(INITIAL_QUERY_TEXT.to_string()),
            results,
        }
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn metric_id(&self) -> &str {
        &self.metric_id
    }

    /// Current editor text.
    pub fn draft(&self) -> String {
        self.draft.lock().clone()
    }

    /// Replace the editor text without submitting.
    pub fn set_draft(&self, text: impl Into<String>) {
        *self.draft.lock() = text.into();
    }

    /// Last submitted query text.
    pub fn committed(&self) -> String {
        self.results.deps()
    }

    /// Normalize the draft's indentation.
    ///
    /// On parse failure the draft is left exactly as typed so the
    /// operator can correct it.
    pub fn format(&self) -> Result<()> {
        let formatted = format_query_text(&self.draft())?;
        *self.draft.lock() = formatted;
        Ok(())
    }

    /// Format the draft, then commit it, triggering the refetch.
    ///
    /// A draft that is not valid query JSON aborts the submit before
    /// anything is committed; the draft text is untouched.
    pub async fn submit(&self) -> Result<()> {
        self.format()?;
        self.results.set_deps(self.draft()).await;
        Ok(())
    }

    /// Re-run the committed query.
    pub async fn refresh(&self) {
        self.results.refresh().await;
    }

    /// Derive the renderable result table.
    pub fn view_model(&self) -> QueryViewModel {
        let state = self.results.snapshot();
        let rows = state
            .body
            .rows
            .into_iter()
            .map(|row| QueryRow {
                metric_key: row
                    .metric_key
                    .unwrap_or_else(|| self.metric_id.clone()),
                time: format_time_ns(row.time),
                time_ns: row.time,
                value_json: serde_json::to_string_pretty(&row.value)
                    .unwrap_or_else(|_| row.value.to_string()),
                value: row.value,
            })
            .collect();

        QueryViewModel {
            rows,
            cursor: state.body.cursor,
            query_time: state.body.query_time_ns.map(format_query_time),
            is_loading: state.is_loading,
            error: state.error,
        }
    }
}
