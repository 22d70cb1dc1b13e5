//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from the YAML service
//! table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Declarative service table, dispatched in declaration order.
    pub services: Vec<ServiceEntry>,

    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Admission-control limits. Absent values disable the corresponding
    /// middleware.
    pub limits: LimitsConfig,

    /// Active health-check settings for load-balanced services.
    pub health_check: HealthCheckConfig,

    /// Directory service used by `auth: login` entries.
    pub directory: Option<DirectoryConfig>,

    /// Optional path at which the static token-issuance endpoint is mounted.
    pub token_route: Option<String>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// One entry in the service table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    /// URL path prefix; registered with and without trailing slash.
    pub route: String,

    /// Absolute HTTP(S) URL, comma-separated list of such URLs (load-balancer
    /// mode), or a single `ws://` URL (WebSocket mode).
    #[serde(default)]
    pub target: Option<String>,

    /// Directory containing `*.html` templates. Mutually exclusive with
    /// `target`.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Sub-path alias -> template filename.
    #[serde(default)]
    pub template_routes: HashMap<String, String>,

    /// Per-route access log path, opened in append mode at startup.
    #[serde(default)]
    pub log: Option<PathBuf>,

    /// Authentication mode for the route.
    #[serde(default)]
    pub auth: AuthMode,

    /// Session lifetime in seconds (`auth: login` only).
    #[serde(default = "default_session_duration")]
    pub session_duration: u64,
}

impl ServiceEntry {
    /// Split the comma-separated target into trimmed elements.
    pub fn target_list(&self) -> Vec<&str> {
        self.target
            .as_deref()
            .map(|t| t.split(',').map(str::trim).collect())
            .unwrap_or_default()
    }

    /// Whether the target selects WebSocket mode.
    pub fn is_websocket(&self) -> bool {
        self.target
            .as_deref()
            .is_some_and(|t| t.trim().starts_with("ws://"))
    }
}

/// Authentication mode of a service entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    None,
    /// Bearer-token middleware.
    Private,
    /// Cookie-session middleware with mounted login/logout routes.
    Login,
}

fn default_session_duration() -> u64 {
    3600
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum simultaneous accepted connections.
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 100,
        }
    }
}

/// Admission-control configuration. Each limiter is independent and only
/// mounted when its field is present.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LimitsConfig {
    /// Per-IP request rate (token-bucket refill, requests per second).
    pub requests_per_second: Option<u32>,

    /// Token-bucket burst capacity. Defaults to `requests_per_second`.
    pub burst: Option<u32>,

    /// Per-IP concurrent-connection cap.
    pub max_conns_per_ip: Option<usize>,

    /// Process-wide in-flight request cap.
    pub queue_size: Option<usize>,
}

/// Active health-check configuration.
///
/// Note for operators: a backend answering 4xx is still considered healthy;
/// only transport errors and 5xx responses take it out of rotation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthCheckConfig {
    /// Seconds between probes of the same backend.
    pub interval_secs: u64,

    /// Per-probe request deadline in seconds.
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            timeout_secs: 2,
        }
    }
}

/// Directory service used for `auth: login` binds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryConfig {
    /// Directory host name.
    pub host: String,

    /// Directory port.
    #[serde(default = "default_directory_port")]
    pub port: u16,

    /// Domain appended to the username for the bind principal and used to
    /// derive the search base.
    pub domain: String,
}

fn default_directory_port() -> u16 {
    389
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
