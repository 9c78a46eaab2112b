//! Centralized default constants for marquee.
//!
//! **This module is the single source of truth** for shared default values.
//! The server, the store implementations, and the client all reference these
//! constants instead of defining their own magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Page size used when the request omits `limit` or sends an unusable value.
pub const PAGE_LIMIT: i64 = 20;

/// Upper bound for `limit`; larger requests are clamped to this.
pub const PAGE_LIMIT_MAX: i64 = 100;

/// Page size the table view requests.
pub const TABLE_PAGE_LIMIT: i64 = 15;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 500;

/// Maximum length of any optional text field in characters.
pub const TEXT_FIELD_MAX_CHARS: usize = 10_000;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const SERVER_PORT: u16 = 4000;

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/marquee";

/// Maximum accepted request body size in bytes.
pub const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

/// Keep-alive interval for the mutation event stream, in seconds.
pub const SSE_KEEPALIVE_SECS: u64 = 15;

/// Buffer capacity of the mutation event bus.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// CLIENT
// =============================================================================

/// Default API base URL for the client.
pub const API_URL: &str = "http://localhost:4000";

/// Lookahead margin (pixels) around the viewport for the scroll sentinel.
pub const SCROLL_ROOT_MARGIN_PX: f64 = 200.0;
