//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::BoundedListener)
//!     → server.rs (axum serve, graceful shutdown)
//!     → routing layer dispatches to proxy / LB / templates
//!     → websocket.rs for ws:// targets (connection hijack + frame pumps)
//! ```

pub mod server;
pub mod websocket;

pub use server::GatewayServer;
