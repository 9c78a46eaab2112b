//! Structured logging schema and field name constants for marquee.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same field names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Store failure surfaced as 500, requires operator attention |
//! | WARN  | Recoverable issue, fallback applied (bad query param, lagged stream) |
//! | INFO  | Lifecycle events (startup, shutdown), mutations |
//! | DEBUG | Decision points: page boundaries, coalesced fetches, invalidations |
//! | TRACE | Per-item iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: [`SUBSYSTEM_API`], [`SUBSYSTEM_DB`], [`SUBSYSTEM_CLIENT`]
pub const SUBSYSTEM: &str = "subsystem";

/// HTTP server: handlers, middleware, startup.
pub const SUBSYSTEM_API: &str = "api";

/// Record store and connection pool.
pub const SUBSYSTEM_DB: &str = "db";

/// API client, listings, scroll trigger.
pub const SUBSYSTEM_CLIENT: &str = "client";

/// Component within a subsystem.
/// Examples: "favorites", "pool", "hook", "scroll_trigger"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "list_page", "update", "delete", "fetch_next_page"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Favorite entry id being operated on.
pub const FAVORITE_ID: &str = "favorite_id";

/// Pagination cursor (last seen id).
pub const CURSOR: &str = "cursor";

/// Effective page size.
pub const LIMIT: &str = "limit";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Whether a page reported more rows after it.
pub const HAS_MORE: &str = "has_more";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
