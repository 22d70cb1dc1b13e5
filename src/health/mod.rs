//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (per backend)
//!     → GET backend root through the shared outbound client, bounded deadline
//!     → healthy = no transport error and status < 500
//!     → Backend.healthy flag, read by the load balancer's selector
//! ```
//!
//! # Design Decisions
//! - Probe failures are swallowed into the flag, never surfaced to clients
//! - The selector observes flips eventually; no lock, no threshold hysteresis

pub mod active;

pub use active::HealthMonitor;
