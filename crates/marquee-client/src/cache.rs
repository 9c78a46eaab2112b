//! Shared registry of infinite listings, keyed by page size.
//!
//! Every view asking for the same page size shares one [`InfiniteFavorites`].
//! Any mutation invalidates every listing, since a create, update, or delete
//! can move entries across page boundaries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use marquee_core::{logging, EventEnvelope, PageRequest};

use crate::client::PageSource;
use crate::hook::InfiniteFavorites;

/// Listings shared by page size.
pub struct QueryCache {
    source: Arc<dyn PageSource>,
    entries: Mutex<HashMap<i64, Arc<InfiniteFavorites>>>,
}

impl QueryCache {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Arc<InfiniteFavorites>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The listing for `limit`, created on first use. Limits are normalized
    /// first, so `0` and `20` share an entry.
    pub fn infinite(&self, limit: i64) -> Arc<InfiniteFavorites> {
        let limit = PageRequest::first(limit).limit();
        self.lock()
            .entry(limit)
            .or_insert_with(|| Arc::new(InfiniteFavorites::new(self.source.clone(), limit)))
            .clone()
    }

    /// Invalidate every listing without fetching.
    pub fn invalidate_all(&self) {
        let listings = self.listings();
        debug!(
            subsystem = logging::SUBSYSTEM_CLIENT,
            component = "query_cache",
            listing_count = listings.len(),
            "Invalidating all listings"
        );
        for listing in listings {
            listing.invalidate();
        }
    }

    /// Invalidate every listing and fetch each first page again.
    pub async fn refetch_all(&self) {
        for listing in self.listings() {
            listing.refetch().await;
        }
    }

    /// Forget the listing for `limit`. Holders of the `Arc` keep a working
    /// (now unshared) listing.
    pub fn evict(&self, limit: i64) -> bool {
        let limit = PageRequest::first(limit).limit();
        self.lock().remove(&limit).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn listings(&self) -> Vec<Arc<InfiniteFavorites>> {
        self.lock().values().cloned().collect()
    }

    /// Refetch every listing whenever a mutation event arrives.
    ///
    /// A lagged receiver counts as one more change. The task ends when the
    /// event bus is dropped.
    pub fn spawn_invalidation(
        self: Arc<Self>,
        mut rx: broadcast::Receiver<EventEnvelope>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(envelope) => {
                        debug!(
                            subsystem = logging::SUBSYSTEM_CLIENT,
                            component = "query_cache",
                            event_type = %envelope.event_type,
                            favorite_id = envelope.payload.favorite_id(),
                            "Mutation observed"
                        );
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            subsystem = logging::SUBSYSTEM_CLIENT,
                            component = "query_cache",
                            skipped,
                            "Invalidation listener lagged"
                        );
                    }
                    Err(RecvError::Closed) => {
                        info!(
                            subsystem = logging::SUBSYSTEM_CLIENT,
                            component = "query_cache",
                            "Event bus closed, invalidation listener stopping"
                        );
                        break;
                    }
                }
                self.refetch_all().await;
            }
        })
    }
}
