//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request on a multi-target route
//!     → pool.rs (counter-based round robin, skip unhealthy)
//!     → backend.rs (health flag, target URL)
//!     → proxy::forward to the selected backend, or 502 if none healthy
//! ```
//!
//! # Design Decisions
//! - Selection is lock-free; health flags need no happens-before guarantee
//! - Unhealthy backends are skipped, not fenced: a flag flip re-enters the
//!   backend on the very next assignment
//! - Monitors are spawned in health::active, one per backend

pub mod backend;
pub mod pool;

pub use backend::Backend;
pub use pool::LoadBalancer;
