//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! auth: private  → bearer.rs (stateless HS256 validation, 401 on failure)
//! auth: login    → session.rs (cookie JWT scoped to the route)
//!                      → directory.rs (bind + search on POST /login)
//! tokenRoute     → token.rs (static credential → 24h bearer token)
//! ```
//!
//! # Design Decisions
//! - One symmetric secret signs every token; sessions are additionally bound
//!   to their issuing route through the `scope` claim
//! - The secret comes from the environment at startup; assembly fails when a
//!   protected route is configured without it

pub mod bearer;
pub mod directory;
pub mod session;
pub mod token;

use jsonwebtoken::{DecodingKey, EncodingKey};

pub use directory::{DirectoryError, DirectoryUser};
pub use session::SessionContext;

/// Signing and verification keys derived from the shared HMAC secret.
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}
