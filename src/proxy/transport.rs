//! Shared outbound transport.

use std::time::Duration;

use axum::body::Body;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use native_tls::TlsConnector;

/// The pooled HTTP(S) client shared by every proxy, load balancer and health
/// probe.
pub type SharedClient = Client<HttpsConnector<HttpConnector>, Body>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Build the outbound client. Called once at assembly; handlers receive
/// clones, which share the underlying connection pool.
///
/// The TCP connector dials both `http` and `https` targets; TLS handshakes
/// ride on the system trust store.
pub fn build_client() -> Result<SharedClient, native_tls::Error> {
    let mut http = HttpConnector::new();
    http.set_connect_timeout(Some(CONNECT_TIMEOUT));
    http.set_keepalive(Some(KEEP_ALIVE));
    // The TLS connector decides the scheme; the inner dialer must not.
    http.enforce_http(false);

    let tls = TlsConnector::new()?;
    let https = HttpsConnector::from((http, tls.into()));

    Ok(Client::builder(TokioExecutor::new()).build(https))
}
