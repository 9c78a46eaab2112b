//! Infinite-scroll state over a cursor-paginated favorites listing.
//!
//! [`InfiniteFavorites`] holds the pages fetched so far for one page size and
//! hands out at most one fetch at a time. A fetch is split into a synchronous
//! claim ([`InfiniteFavorites::begin_fetch`]) and an async completion, so a
//! caller running on a non-async callback (the scroll trigger) can decide
//! atomically whether it owns the next request.
//!
//! Invalidation bumps a generation counter and clears the pages; a fetch that
//! started under an older generation has its result dropped on arrival.
//!
//! Every appended page bumps a [`watch`] counter, so observers such as the
//! scroll trigger can re-evaluate once new rows land.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::debug;

use marquee_core::{logging, FavoriteEntry, FavoritePage, PageRequest};

use crate::client::PageSource;
use crate::error::ClientError;

/// Overall state of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No page has arrived yet.
    Loading,
    /// The first page failed.
    Error,
    /// At least one page is loaded.
    Success,
}

/// Result of a fetch request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A page arrived and was appended; carries the number of new entries.
    Appended(usize),
    /// Another fetch is in flight; nothing was requested.
    AlreadyFetching,
    /// The last page reported no more entries; nothing was requested.
    NoMorePages,
    /// The listing was invalidated while the request was in flight.
    Discarded,
    /// The request failed.
    Failed(ClientError),
}

/// Permission to perform the single in-flight fetch.
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
    cursor: Option<i64>,
}

impl FetchTicket {
    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }
}

#[derive(Debug)]
struct HookState {
    pages: Vec<FavoritePage>,
    status: QueryStatus,
    error: Option<ClientError>,
    generation: u64,
    in_flight: bool,
}

/// Pages of favorites fetched so far for a fixed page size.
pub struct InfiniteFavorites {
    source: Arc<dyn PageSource>,
    limit: i64,
    state: Mutex<HookState>,
    landed: watch::Sender<u64>,
}

impl InfiniteFavorites {
    /// New, empty listing. Nothing is fetched until [`refetch`](Self::refetch)
    /// or [`fetch_next_page`](Self::fetch_next_page) is called.
    pub fn new(source: Arc<dyn PageSource>, limit: i64) -> Self {
        Self {
            source,
            limit: PageRequest::first(limit).limit(),
            state: Mutex::new(HookState {
                pages: Vec::new(),
                status: QueryStatus::Loading,
                error: None,
                generation: 0,
                in_flight: false,
            }),
            landed: watch::channel(0).0,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HookState> {
        // State stays consistent under panic: every mutation is a single assignment.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn status(&self) -> QueryStatus {
        self.lock().status
    }

    /// The most recent fetch error, cleared by the next successful page.
    pub fn error(&self) -> Option<ClientError> {
        self.lock().error.clone()
    }

    /// Every fetched entry, in fetch order (descending id).
    pub fn items(&self) -> Vec<FavoriteEntry> {
        self.lock()
            .pages
            .iter()
            .flat_map(|page| page.data.iter().cloned())
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.lock().pages.len()
    }

    /// Whether the last fetched page reported more entries.
    pub fn has_next_page(&self) -> bool {
        self.lock().pages.last().map_or(false, |page| page.has_more)
    }

    /// A fetch of any page is in flight.
    pub fn is_fetching(&self) -> bool {
        self.lock().in_flight
    }

    /// A fetch beyond the first page is in flight.
    pub fn is_fetching_next_page(&self) -> bool {
        let state = self.lock();
        state.in_flight && !state.pages.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Counter of appended pages. Changes after every page that lands,
    /// including a first page fetched by a refetch.
    pub fn subscribe_pages(&self) -> watch::Receiver<u64> {
        self.landed.subscribe()
    }

    /// Claim the in-flight slot for the next page.
    ///
    /// With no pages loaded this claims the first page. Fails without side
    /// effects when a fetch is already in flight or no more pages exist.
    pub fn begin_fetch(&self) -> Result<FetchTicket, FetchOutcome> {
        let mut state = self.lock();
        if state.in_flight {
            return Err(FetchOutcome::AlreadyFetching);
        }

        let cursor = match state.pages.last() {
            None => None,
            Some(page) if page.has_more => page.next_cursor,
            Some(_) => return Err(FetchOutcome::NoMorePages),
        };

        state.in_flight = true;
        Ok(FetchTicket {
            generation: state.generation,
            cursor,
        })
    }

    /// Perform the claimed fetch and merge its result.
    pub async fn complete(&self, ticket: FetchTicket) -> FetchOutcome {
        let result = self.source.fetch_page(self.limit, ticket.cursor).await;

        let mut state = self.lock();
        if state.generation != ticket.generation {
            debug!(
                subsystem = logging::SUBSYSTEM_CLIENT,
                component = "infinite",
                ticket_generation = ticket.generation,
                generation = state.generation,
                "Discarding superseded page"
            );
            return FetchOutcome::Discarded;
        }
        state.in_flight = false;

        let outcome = match result {
            Ok(page) => {
                let count = page.data.len();
                state.pages.push(page);
                state.status = QueryStatus::Success;
                state.error = None;
                FetchOutcome::Appended(count)
            }
            Err(err) => {
                if state.pages.is_empty() {
                    state.status = QueryStatus::Error;
                }
                state.error = Some(err.clone());
                FetchOutcome::Failed(err)
            }
        };
        drop(state);

        if matches!(outcome, FetchOutcome::Appended(_)) {
            self.landed.send_modify(|pages| *pages += 1);
        }
        outcome
    }

    /// Fetch the next page unless one is already in flight.
    pub async fn fetch_next_page(&self) -> FetchOutcome {
        match self.begin_fetch() {
            Ok(ticket) => self.complete(ticket).await,
            Err(outcome) => outcome,
        }
    }

    /// Drop every fetched page and return to the loading state.
    ///
    /// Any fetch in flight is superseded; its result will be discarded.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.pages.clear();
        state.in_flight = false;
        state.status = QueryStatus::Loading;
        state.error = None;
        debug!(
            subsystem = logging::SUBSYSTEM_CLIENT,
            component = "infinite",
            limit = self.limit,
            generation = state.generation,
            "Listing invalidated"
        );
    }

    /// Invalidate and fetch the first page again.
    pub async fn refetch(&self) -> FetchOutcome {
        self.invalidate();
        self.fetch_next_page().await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use marquee_core::MediaType;
    use tokio::sync::Semaphore;

    pub fn entry(id: i64) -> FavoriteEntry {
        let now = chrono::Utc::now();
        FavoriteEntry {
            id,
            title: format!("Entry {}", id),
            media_type: MediaType::Movie,
            director: None,
            budget: None,
            location: None,
            duration: None,
            year_time: None,
            poster_url: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Scripted page source over a descending id list. A gated source holds
    /// each fetch until the test adds a permit.
    pub struct ScriptedSource {
        pub ids: Mutex<Vec<i64>>,
        pub calls: Mutex<Vec<Option<i64>>>,
        pub gate: Option<Arc<Semaphore>>,
        pub fail: Mutex<bool>,
    }

    impl ScriptedSource {
        pub fn new(total: i64) -> Self {
            Self {
                ids: Mutex::new((1..=total).rev().collect()),
                calls: Mutex::new(Vec::new()),
                gate: None,
                fail: Mutex::new(false),
            }
        }

        pub fn gated(total: i64, gate: Arc<Semaphore>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(total)
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Simulate a create: the new row gets the next id.
        pub fn insert(&self) -> i64 {
            let mut ids = self.ids.lock().unwrap();
            let id = ids.first().copied().unwrap_or(0) + 1;
            ids.insert(0, id);
            id
        }

        pub fn set_failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page(
            &self,
            limit: i64,
            cursor: Option<i64>,
        ) -> crate::error::Result<FavoritePage> {
            self.calls.lock().unwrap().push(cursor);
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if *self.fail.lock().unwrap() {
                return Err(ClientError::Http {
                    status: 500,
                    message: "Server error".into(),
                });
            }
            let req = PageRequest::new(Some(limit), cursor);
            let rows: Vec<FavoriteEntry> = self
                .ids
                .lock()
                .unwrap()
                .iter()
                .copied()
                .filter(|id| req.admits(*id))
                .take(req.fetch_size() as usize)
                .map(entry)
                .collect();
            Ok(marquee_core::page_from_lookahead(rows, req.limit()))
        }
    }
}
