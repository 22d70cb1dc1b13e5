//! Per-route access logging.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Method, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use chrono::{SecondsFormat, Utc};

use crate::net::ClientAddr;
use crate::observability::metrics;

/// Append-only access log for one route. Writes are small single lines; the
/// mutex serializes formatting, the file descriptor handles the append.
pub struct AccessLog {
    route: String,
    file: Mutex<File>,
}

impl AccessLog {
    /// Open (or create) the log file in append mode. Failure is fatal at
    /// startup; the caller refuses to serve with an incomplete table.
    pub fn open(path: &Path, route: &str) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            route: route.to_string(),
            file: Mutex::new(file),
        })
    }

    fn write_line(
        &self,
        remote: SocketAddr,
        method: &Method,
        uri: &Uri,
        status: StatusCode,
        latency: Duration,
    ) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut file = self.file.lock().expect("access log mutex poisoned");
        let _ = writeln!(
            file,
            "[{}] {} {} {} -> {} {:?}",
            timestamp,
            remote,
            method,
            uri,
            status.as_u16(),
            latency
        );
    }
}

/// Middleware: captures the response status and emits one line per request.
pub async fn access_log_middleware(
    State(log): State<std::sync::Arc<AccessLog>>,
    ConnectInfo(addr): ConnectInfo<ClientAddr>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    log.write_line(addr.0, &method, &uri, response.status(), start.elapsed());
    metrics::record_request(&log.route, response.status().as_u16());

    response
}
