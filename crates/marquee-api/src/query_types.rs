//! Query parameter types that never reject a request.
//!
//! Listing parameters are advisory: a malformed value is treated as if it
//! had not been sent, so `?limit=abc` behaves like no limit at all.

use serde::{Deserialize, Deserializer};
use std::ops::Deref;

use marquee_core::PageRequest;

/// An integer query value that deserializes to `None` instead of failing.
///
/// # Example
///
/// ```rust,ignore
/// use marquee_api::query_types::LenientInt;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Query {
///     #[serde(default)]
///     limit: LenientInt,
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LenientInt(pub Option<i64>);

impl LenientInt {
    /// Returns the parsed value, if any.
    pub fn into_inner(self) -> Option<i64> {
        self.0
    }
}

impl Deref for LenientInt {
    type Target = Option<i64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for LenientInt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(LenientInt(parse_lenient_int(&s)))
    }
}

/// Parse a decimal integer, ignoring surrounding whitespace.
///
/// A fractional number is truncated toward zero (`"2.9"` is 2). Anything else
/// that is not a finite number yields `None`.
fn parse_lenient_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Some(f.trunc() as i64),
        _ => None,
    }
}

/// `GET /api/favorites` query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Page size (default 20, clamped to 100).
    #[serde(default)]
    pub limit: LenientInt,
    /// Id of the last entry already seen.
    #[serde(default)]
    pub cursor: LenientInt,
}

impl PageQuery {
    /// Normalize into a store request.
    pub fn to_request(self) -> PageRequest {
        PageRequest::new(self.limit.into_inner(), self.cursor.into_inner())
    }
}
