//! Store info view: live health of the storage cluster

use std::time::Duration;

use crate::api::ApiClient;
use crate::models::{StoreListResponse, StoreStatus};
use crate::poll::Poller;
use crate::resource::{Resource, ResourceState};

/// Controller for the cluster store listing with auto-refresh.
///
/// Binds the store-list fetch and a poller that is enabled by default,
/// mirroring the operator expectation of a live monitoring page.
pub struct StoreInfoController {
    stores: Resource<StoreListResponse, ()>,
    poller: Poller,
}

impl StoreInfoController {
    /// Default auto-refresh period used when the config carries none.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

    /// Bind the store list, fetch once, and start polling.
    pub async fn bind(api: ApiClient, poll_interval: Duration) -> Self {
        let stores = Resource::bind((), StoreListResponse::default(), move |_| {
            let api = api.clone();
            async move { api.store_list().await }
        })
        .await;

        let poller = Poller::start(stores.clone(), poll_interval, true);
        Self { stores, poller }
    }

    pub fn state(&self) -> ResourceState<StoreListResponse> {
        self.stores.snapshot()
    }

    /// Current store snapshots.
    pub fn stores(&self) -> Vec<StoreStatus> {
        self.stores.body().stores
    }

    /// Manual refresh, independent of the poller.
    pub async fn refresh(&self) {
        self.stores.refresh().await;
    }

    pub fn auto_refresh(&self) -> bool {
        self.poller.is_enabled()
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        self.poller.set_enabled(enabled);
    }

    /// Flip auto-refresh, returning the new setting.
    pub fn toggle_auto_refresh(&self) -> bool {
        self.poller.toggle()
    }
}
