//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (CORS, OPTIONS short-circuit, security headers, JSON 404)
//!     → conn_limit.rs (process-wide queue cap)
//!     → per-route: rate_limit.rs, conn_limit.rs (per-IP admission)
//!     → Pass to the dispatch handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: a refused permit is an immediate 429/503, never a wait
//! - Per-IP maps grow with observed client cardinality and are not evicted

pub mod conn_limit;
pub mod headers;
pub mod rate_limit;

pub use conn_limit::{ConnLimiter, QueueLimiter};
pub use rate_limit::RateLimiter;
