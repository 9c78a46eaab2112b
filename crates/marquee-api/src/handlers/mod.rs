//! HTTP handlers for marquee-api.

pub mod favorites;
pub mod health;
