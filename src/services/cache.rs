use std::sync::Arc;
use std::time::Duration;

use crate::models::StandingSearch;

const ACTIVE_KEY: &str = "active_searches";

/// In-memory cache of the active standing-search working set.
///
/// The match evaluator reads this set on every profile write; the cache
/// bounds staleness to the configured TTL (default 5s) and is invalidated
/// on every registry write, so a toggle or re-submission is visible
/// immediately on the instance that performed it.
pub struct ActiveSearchCache {
    inner: moka::future::Cache<&'static str, Arc<Vec<StandingSearch>>>,
}

impl ActiveSearchCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let inner = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner }
    }

    pub async fn get(&self) -> Option<Arc<Vec<StandingSearch>>> {
        self.inner.get(ACTIVE_KEY).await
    }

    pub async fn set(&self, searches: Vec<StandingSearch>) -> Arc<Vec<StandingSearch>> {
        let value = Arc::new(searches);
        self.inner.insert(ACTIVE_KEY, Arc::clone(&value)).await;
        value
    }

    pub async fn invalidate(&self) {
        self.inner.invalidate(ACTIVE_KEY).await;
        tracing::trace!("Invalidated active search cache");
    }
}
