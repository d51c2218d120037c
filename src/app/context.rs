use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::app::Result;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::FeedFetcher;
use crate::store::sqlite::SqliteStore;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub fetcher: Arc<dyn FeedFetcher + Send + Sync>,
}

impl AppContext {
    pub fn new(db_url: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_url).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Arc::new(SqliteStore::new(db_url)?);
        let fetcher: Arc<dyn FeedFetcher + Send + Sync> = Arc::new(HttpFetcher::new());

        Ok(Self { store, fetcher })
    }

    pub fn in_memory() -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let fetcher: Arc<dyn FeedFetcher + Send + Sync> = Arc::new(HttpFetcher::new());

        Ok(Self { store, fetcher })
    }

    /// Build a context around an existing store and a caller-supplied
    /// fetcher. Used by tests to substitute a canned feed source.
    pub fn with_fetcher(
        store: Arc<SqliteStore>,
        fetcher: Arc<dyn FeedFetcher + Send + Sync>,
    ) -> Self {
        Self { store, fetcher }
    }
}
