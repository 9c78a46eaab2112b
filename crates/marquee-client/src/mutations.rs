//! Create, update, and delete with cache invalidation.
//!
//! A successful mutation is announced on the client's [`EventBus`]; the
//! [`QueryCache`](crate::cache::QueryCache) listens there and refetches. A
//! failed mutation invalidates nothing and leaves a message in
//! [`MutationFeedback`] for the view to show.

use std::sync::{Arc, Mutex};

use tracing::warn;

use marquee_core::{
    logging, EventBus, FavoriteEntry, FavoriteEvent, FavoritePatch, NewFavorite,
};

use crate::client::FavoritesClient;
use crate::error::{ClientError, Result};

/// Last mutation failure, for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationFeedback {
    pub last_error: Option<String>,
}

impl MutationFeedback {
    pub fn clear(&mut self) {
        self.last_error = None;
    }
}

/// Mutations against the favorites API.
pub struct Mutations {
    client: FavoritesClient,
    events: Arc<EventBus>,
    feedback: Mutex<MutationFeedback>,
}

impl Mutations {
    pub fn new(client: FavoritesClient, events: Arc<EventBus>) -> Self {
        Self {
            client,
            events,
            feedback: Mutex::new(MutationFeedback::default()),
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn feedback(&self) -> MutationFeedback {
        self.feedback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear_feedback(&self) {
        self.feedback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub async fn create(&self, new: &NewFavorite) -> Result<FavoriteEntry> {
        let result = self.client.create(new).await;
        self.settle("Create", result, |entry| FavoriteEvent::Created { id: entry.id })
    }

    pub async fn update(&self, id: i64, patch: &FavoritePatch) -> Result<FavoriteEntry> {
        let result = self.client.update(id, patch).await;
        self.settle("Update", result, |entry| FavoriteEvent::Updated { id: entry.id })
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = self.client.delete(id).await;
        self.settle("Delete", result, |_| FavoriteEvent::Deleted { id })
    }

    fn settle<T>(
        &self,
        action: &str,
        result: Result<T>,
        event: impl FnOnce(&T) -> FavoriteEvent,
    ) -> Result<T> {
        let mut feedback = self
            .feedback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match result {
            Ok(value) => {
                feedback.clear();
                drop(feedback);
                self.events.emit(event(&value));
                Ok(value)
            }
            Err(err) => {
                warn!(
                    subsystem = logging::SUBSYSTEM_CLIENT,
                    component = "mutations",
                    action,
                    error = %err,
                    "Mutation failed"
                );
                feedback.last_error = Some(failure_message(action, &err));
                Err(err)
            }
        }
    }
}

fn failure_message(action: &str, err: &ClientError) -> String {
    format!("{} failed: {}", action, err.user_message())
}
