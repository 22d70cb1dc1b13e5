//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request path:
//!     → logging.rs (per-route access log line with captured status)
//!     → metrics.rs (counters, health gauge; Prometheus scrape endpoint)
//!
//! Process diagnostics go through `tracing`, initialized in main.
//! ```
//!
//! # Design Decisions
//! - Access logs are plain append-only files; rotation is the operator's job
//! - Metrics are cheap atomic updates and default to disabled

pub mod logging;
pub mod metrics;

pub use logging::AccessLog;
