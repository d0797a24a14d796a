use std::sync::Arc;

use tickersnap_core::SnapshotFetcher;

/// Shared application state: built once in `main`, cloned per request.
#[derive(Clone)]
pub struct AppState {
    fetcher: Arc<SnapshotFetcher>,
}

impl AppState {
    pub fn new(fetcher: Arc<SnapshotFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &SnapshotFetcher {
        &self.fetcher
    }
}
