//! Outbound proxying subsystem.
//!
//! # Data Flow
//! ```text
//! Matched request
//!     → transport.rs (shared pooled client, built once)
//!     → forward.rs (URI rewrite to target, forward, map failures to 502)
//!     → Response streamed back to the client
//! ```
//!
//! # Design Decisions
//! - One client for every HTTP service and health probe so keep-alive
//!   pooling is shared and health always reflects reachable targets
//! - The connector speaks both http and https; TLS uses the system roots
//! - Scheme/authority are rewritten; path, query, headers and body pass
//!   through untouched
//! - Upstream failures surface as 502, never retried

pub mod forward;
pub mod transport;

pub use forward::forward;
pub use transport::{build_client, SharedClient};
