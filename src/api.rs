//! Typed HTTP client for the SushiDB API and the PD store endpoint

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{ConsoleError, Result};
use crate::models::{MetricKey, MetricResponse, MetricType, StoreListResponse};
use crate::query::{QueryRequest, QueryResponse, SortOrder};

/// Optional range parameters for `GET /metric/{type}/{id}`.
///
/// Rendered as percent-encoded query pairs; the `?` only appears when
/// at least one option is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
    pub limit: Option<u32>,
    pub sort: Option<SortOrder>,
}

impl FetchOptions {
    fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        if let Some(lower) = self.lower {
            pairs.append_pair("lower", &lower.to_string());
        }
        if let Some(upper) = self.upper {
            pairs.append_pair("upper", &upper.to_string());
        }
        if let Some(limit) = self.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(sort) = self.sort {
            let name = match sort {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            pairs.append_pair("sort", name);
        }
        drop(pairs);
        // reqwest keeps an empty `?` if no pair was appended
        if url.query() == Some("") {
            url.set_query(None);
        }
    }
}

/// HTTP client bound to one API base URL.
///
/// Cheap to clone; all methods decode JSON into the typed models and
/// turn non-2xx statuses into [`ConsoleError::UnexpectedStatus`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Create a client from the resolved configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.api_base)
            .map_err(|e| ConsoleError::Config(format!("invalid api base: {}", e)))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// `GET /keys` - list every stored metric key.
    pub async fn list_keys(&self) -> Result<Vec<MetricKey>> {
        self.get_json(self.url(&["keys"])?).await
    }

    /// `GET /metric/{type}/{id}` - fetch rows for one metric.
    pub async fn metric_rows(
        &self,
        metric_type: MetricType,
        metric_id: &str,
        options: &FetchOptions,
    ) -> Result<MetricResponse> {
        let mut url = self.url(&["metric", metric_type.as_str(), metric_id])?;
        options.apply(&mut url);
        self.get_json(url).await
    }

    /// `DELETE /metric/{type}/{id}` - delete a metric, status only.
    pub async fn delete_metric(&self, key: &MetricKey) -> Result<()> {
        let url = self.url(&["metric", key.metric_type.as_str(), &key.metric_id])?;
        debug!(url = %url, "deleting metric");
        let response = self.http.delete(url.clone()).send().await?;
        self.check_status(&url, response.status())?;
        Ok(())
    }

    /// `POST /query/{type}` - filtered query over stored metrics.
    pub async fn query(
        &self,
        metric_type: MetricType,
        request: &QueryRequest,
    ) -> Result<QueryResponse> {
        let url = self.url(&["query", metric_type.as_str()])?;
        debug!(url = %url, keys = request.metric_keys.len(), "running query");
        let response = self.http.post(url.clone()).json(request).send().await?;
        self.check_status(&url, response.status())?;
        response
            .json()
            .await
            .map_err(|e| ConsoleError::Decode(e.to_string()))
    }

    /// `GET /pd/api/v1/stores` - cluster store status snapshot.
    pub async fn store_list(&self) -> Result<StoreListResponse> {
        self.get_json(self.url(&["pd", "api", "v1", "stores"])?).await
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ConsoleError::Config("api base cannot carry path segments".to_string())
            })?;
            path.pop_if_empty();
            // push() percent-encodes each segment
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.http.get(url.clone()).send().await?;
        self.check_status(&url, response.status())?;
        response
            .json()
            .await
            .map_err(|e| ConsoleError::Decode(e.to_string()))
    }

    fn check_status(&self, url: &Url, status: StatusCode) -> Result<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(ConsoleError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}
