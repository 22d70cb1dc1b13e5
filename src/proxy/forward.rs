//! Single-host request forwarding.

use std::str::FromStr;

use axum::{
    body::Body,
    extract::Request,
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::proxy::transport::SharedClient;

/// Forward a request to the given target, rewriting scheme and authority and
/// leaving path, query, headers and body untouched.
pub async fn forward(client: &SharedClient, target: &Url, mut request: Request) -> Response {
    let mut parts = request.uri().clone().into_parts();

    parts.scheme = Some(if target.scheme() == "https" {
        Scheme::HTTPS
    } else {
        Scheme::HTTP
    });

    match Authority::from_str(target.authority()) {
        Ok(authority) => parts.authority = Some(authority),
        Err(_) => return (StatusCode::BAD_GATEWAY, "Invalid backend address").into_response(),
    }

    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }

    match Uri::from_parts(parts) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(_) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "URI rewrite failed").into_response()
        }
    }

    match client.request(request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(
                target = %target,
                error = %e,
                "Upstream request failed"
            );
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}
