//! Configuration-driven HTTP API gateway.
//!
//! A single listening port dispatches each request to one of several
//! downstream targets according to a declarative YAML service table:
//! single-host reverse proxy, round-robin load balancer with active health
//! probing, WebSocket tunnel, or static-template renderer, each optionally
//! behind bearer-token or cookie-session authentication and wrapped with
//! access logging, CORS/security headers and admission control.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod proxy;
pub mod routing;

// Traffic management
pub mod health;
pub mod load_balancer;

// Cross-cutting concerns
pub mod auth;
pub mod observability;
pub mod security;
pub mod templates;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use routing::build_router;
