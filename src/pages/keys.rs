//! Keys view: the full metric-key listing with delete actions

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{MetricKey, MetricType};
use crate::resource::{Resource, ResourceState};

/// One listing row with its derived navigation targets.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRow {
    pub metric_id: String,
    pub metric_type: MetricType,
    pub view_path: String,
    pub query_path: String,
}

/// Controller for the key listing view.
pub struct KeysController {
    api: ApiClient,
    keys: Resource<Vec<MetricKey>, ()>,
}

impl KeysController {
    /// Bind the listing and perform the initial fetch.
    pub async fn bind(api: ApiClient) -> Self {
        let fetch_api = api.clone();
        let keys = Resource::bind((), Vec::new(), move |_| {
            let api = fetch_api.clone();
            async move { api.list_keys().await }
        })
        .await;
        Self { api, keys }
    }

    /// Raw listing state for rendering.
    pub fn state(&self) -> ResourceState<Vec<MetricKey>> {
        self.keys.snapshot()
    }

    /// Listing rows with view/query navigation targets attached.
    pub fn rows(&self) -> Vec<KeyRow> {
        self.keys
            .body()
            .into_iter()
            .map(|key| KeyRow {
                view_path: key.view_path(),
                query_path: key.query_path(),
                metric_id: key.metric_id,
                metric_type: key.metric_type,
            })
            .collect()
    }

    pub async fn refresh(&self) {
        self.keys.refresh().await;
    }

    /// Delete one metric, then refetch the listing.
    ///
    /// The operator confirmation step happens before this call. On
    /// failure the error propagates and the current listing is left
    /// untouched; only a successful delete triggers the refresh.
    pub async fn delete_key(&self, key: &MetricKey) -> Result<()> {
        self.api.delete_metric(key).await?;
        self.keys.refresh().await;
        Ok(())
    }
}
