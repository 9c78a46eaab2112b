//! # marquee-client
//!
//! Client side of the marquee favorites tracker.
//!
//! - [`FavoritesClient`]: reqwest client for `/api/favorites`
//! - [`InfiniteFavorites`]: accumulated pages with a single in-flight fetch
//! - [`QueryCache`]: listings shared by page size, refetched on every mutation
//! - [`ScrollTrigger`]: fetches the next page when the bottom sentinel shows
//! - [`view`]: table, form, and confirm dialog view-models
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use marquee_client::{FavoritesClient, Mutations, QueryCache, view::FavoriteTable};
//! use marquee_core::EventBus;
//!
//! let client = FavoritesClient::from_env();
//! let events = Arc::new(EventBus::default());
//! let cache = Arc::new(QueryCache::new(Arc::new(client.clone())));
//! cache.clone().spawn_invalidation(events.subscribe());
//!
//! let mutations = Arc::new(Mutations::new(client, events));
//! let table = FavoriteTable::from_cache(&cache, mutations);
//! table.listing().refetch().await;
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod hook;
pub mod mutations;
pub mod scroll;
pub mod view;

pub use cache::QueryCache;
pub use client::{FavoritesClient, PageSource};
pub use error::{ClientError, Result};
pub use hook::{FetchOutcome, FetchTicket, InfiniteFavorites, QueryStatus};
pub use mutations::{MutationFeedback, Mutations};
pub use scroll::{Observation, ScrollTrigger, Sentinel, SentinelId, ViewportObserver};
