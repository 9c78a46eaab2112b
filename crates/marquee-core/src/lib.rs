//! # marquee-core
//!
//! Core types, traits, and abstractions for the marquee favorites tracker.
//!
//! This crate provides the domain model (favorite entries and pages), the
//! request schema used by the HTTP layer, the record store trait, and the
//! mutation event bus shared by the server and the client.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{EventBus, EventEnvelope, FavoriteEvent};
pub use models::*;
pub use pagination::{page_from_lookahead, PageRequest};
pub use traits::*;
pub use validation::{FavoriteSchema, FieldError, ValidationErrors};
