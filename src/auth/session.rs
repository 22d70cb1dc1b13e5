//! Cookie-session middleware and login/logout handlers for `auth: login`
//! routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use cookie::Cookie;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::{directory, JwtKeys};
use crate::config::DirectoryConfig;

pub const SESSION_COOKIE: &str = "session_token";

/// Session claims. `scope` binds the cookie to the issuing route prefix so a
/// session minted by one service never authorizes another.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub scope: String,
    pub exp: u64,
}

/// Everything the session middleware and login handlers need for one route.
#[derive(Clone)]
pub struct SessionContext {
    pub keys: Arc<JwtKeys>,
    pub route: Arc<str>,
    pub duration_secs: u64,
    pub directory: Arc<DirectoryConfig>,
}

impl SessionContext {
    fn login_url(&self) -> String {
        format!("{}/login", self.route)
    }
}

/// Protects the service routes: a missing, invalid, expired or mis-scoped
/// cookie redirects to the route's login page.
pub async fn session_middleware(
    State(ctx): State<SessionContext>,
    request: Request,
    next: Next,
) -> Response {
    let token = session_cookie(request.headers());
    let valid = token
        .as_deref()
        .and_then(|t| verify_session_token(&ctx.keys, &ctx.route, t))
        .is_some();

    if valid {
        next.run(request).await
    } else {
        Redirect::to(&ctx.login_url()).into_response()
    }
}

/// Decode and check a session token against the owning route. Returns the
/// claims only when the signature, expiry and scope all hold.
pub fn verify_session_token(keys: &JwtKeys, route: &str, token: &str) -> Option<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let claims = decode::<SessionClaims>(token, &keys.decoding, &validation)
        .ok()?
        .claims;
    if claims.scope != route {
        return None;
    }
    Some(claims)
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    Cookie::split_parse(raw.to_owned())
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET `<route>/login`.
pub async fn login_page() -> Html<&'static str> {
    Html(include_str!("login.html"))
}

/// POST `<route>/login`: bind against the directory, then issue the
/// route-scoped session cookie and redirect into the service.
pub async fn login_submit(ctx: SessionContext, Form(form): Form<LoginForm>) -> Response {
    let user = match directory::authenticate(&ctx.directory, &form.username, &form.password).await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(user = %form.username, error = %e, "Directory authentication failed");
            return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
        }
    };

    let exp = (chrono::Utc::now() + chrono::Duration::seconds(ctx.duration_secs as i64))
        .timestamp() as u64;
    let claims = SessionClaims {
        sub: user.username,
        scope: ctx.route.to_string(),
        exp,
    };

    let token = match encode(&Header::new(Algorithm::HS256), &claims, &ctx.keys.encoding) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to sign session token");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };

    let expires =
        OffsetDateTime::from_unix_timestamp(exp as i64).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path(ctx.route.to_string())
        .http_only(true)
        .expires(expires)
        .build();

    let mut response = Redirect::to(&format!("{}/", ctx.route)).into_response();
    set_cookie(&mut response, &cookie);
    response
}

/// `<route>/logout`: overwrite the cookie with an immediately expiring empty
/// one, whether or not the client had a session.
pub async fn logout(ctx: SessionContext) -> Response {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path(ctx.route.to_string())
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build();

    let mut response = Redirect::to(&ctx.login_url()).into_response();
    set_cookie(&mut response, &cookie);
    response
}

fn set_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::from_secret(b"test-secret")
    }

    fn sign(keys: &JwtKeys, scope: &str, exp: u64) -> String {
        let claims = SessionClaims {
            sub: "alice".into(),
            scope: scope.into(),
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap()
    }

    fn future_exp() -> u64 {
        (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as u64
    }

    #[test]
    fn test_valid_token_passes() {
        let keys = keys();
        let token = sign(&keys, "/app", future_exp());
        let claims = verify_session_token(&keys, "/app", &token).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[test]
    fn test_scope_mismatch_rejected() {
        let keys = keys();
        let token = sign(&keys, "/app", future_exp());
        assert!(verify_session_token(&keys, "/other", &token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys();
        let exp = (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp() as u64;
        let token = sign(&keys, "/app", exp);
        assert!(verify_session_token(&keys, "/app", &token).is_none());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let keys = keys();
        let other = JwtKeys::from_secret(b"other-secret");
        let token = sign(&other, "/app", future_exp());
        assert!(verify_session_token(&keys, "/app", &token).is_none());
    }
}
