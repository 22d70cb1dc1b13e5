//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Validated GatewayConfig
//!     → assembler.rs (dispatch-mode selection, middleware wrapping,
//!       pattern registration, global wrapper + JSON 404)
//!     → axum Router, served by http::server
//! ```
//!
//! # Design Decisions
//! - The table is built once; there is no dynamic reconfiguration
//! - Dispatch modes are a closed choice made per entry, not a handler
//!   hierarchy
//! - Duplicate routes abort startup via the underlying router

pub mod assembler;

pub use assembler::{build_router, AssembleError};
