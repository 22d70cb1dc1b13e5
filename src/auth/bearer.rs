//! Bearer-token middleware for `auth: private` routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, Validation};
use serde::Deserialize;

use crate::auth::JwtKeys;

/// Claims carried by a bearer token. `exp` is honored when present; nothing
/// is propagated downstream.
#[derive(Debug, Deserialize)]
struct BearerClaims {
    #[serde(default)]
    #[allow(dead_code)]
    sub: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    exp: Option<u64>,
}

pub async fn bearer_middleware(
    State(keys): State<Arc<JwtKeys>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return unauthorized();
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims::<&str>(&[]);

    if decode::<BearerClaims>(token, &keys.decoding, &validation).is_err() {
        return unauthorized();
    }

    next.run(request).await
}

/// Fetch the token from the Authorization header. The `Bearer ` prefix is
/// required exactly, one space included.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}
