//! Static token-issuance endpoint.
//!
//! Mounted at `tokenRoute` when configured. Credentials are compared against
//! `GATEWAY_USER` / `GATEWAY_PASS`; a match yields a 24-hour bearer token
//! usable against `auth: private` routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{encode, Algorithm, Header};
use serde::{Deserialize, Serialize};

use crate::auth::JwtKeys;

const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
struct TokenClaims {
    sub: String,
    iss: String,
    exp: u64,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

pub async fn issue_token(keys: &JwtKeys, query: TokenQuery) -> Response {
    let expected_user = std::env::var("GATEWAY_USER").unwrap_or_default();
    let expected_pass = std::env::var("GATEWAY_PASS").unwrap_or_default();

    if expected_user.is_empty()
        || query.login != expected_user
        || query.password != expected_pass
    {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    }

    let exp = (chrono::Utc::now() + chrono::Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp()
        as u64;
    let claims = TokenClaims {
        sub: query.login,
        iss: "gateway".to_string(),
        exp,
    };

    match encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding) {
        Ok(token) => Json(TokenResponse { token }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to sign token");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error generating token").into_response()
        }
    }
}
