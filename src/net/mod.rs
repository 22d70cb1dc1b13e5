//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, total-connection cap)
//!     → Hand off to the HTTP layer via axum::serve
//! ```

pub mod listener;

pub use listener::{BoundedListener, ClientAddr, ListenerError};
