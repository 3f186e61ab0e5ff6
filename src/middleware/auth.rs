// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token authentication middleware.
//!
//! The browser holds an HS256 JWT whose subject is the session ID. The
//! session itself (credential, vehicles, address) never leaves the server.

use crate::services::session::SessionId;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "delivery_session";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (session ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Session attached to the request by `require_session`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentSession {
    pub id: SessionId,
}

/// Middleware that requires a valid session token naming a live session.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(StatusCode::UNAUTHORIZED),
        }
    };

    let id = decode_session_token(&token, &state.config.session_signing_key)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !state.sessions.contains(id) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert(CurrentSession { id });

    Ok(next.run(request).await)
}

/// Create a JWT for a session.
pub fn create_session_token(
    id: SessionId,
    signing_key: &[u8],
    ttl: Duration,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let exp = now
        .checked_add(ttl.as_secs())
        .ok_or_else(|| anyhow::anyhow!("session TTL out of range"))?;

    let claims = Claims {
        sub: id.to_string(),
        iat: usize::try_from(now)?,
        exp: usize::try_from(exp)?,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a session token and return the session ID it names.
pub fn decode_session_token(token: &str, signing_key: &[u8]) -> Option<SessionId> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    token_data.claims.sub.parse().ok()
}

/// Session ID from the request's cookie, if it names a live session.
pub fn session_from_jar(state: &AppState, jar: &CookieJar) -> Option<SessionId> {
    let token = jar.get(SESSION_COOKIE)?;
    let id = decode_session_token(token.value(), &state.config.session_signing_key)?;
    state.sessions.contains(id).then_some(id)
}

/// Session cookie. `Secure` unless the frontend is served over plain HTTP.
pub fn session_cookie(token: String, frontend_url: &str, ttl: Duration) -> Cookie<'static> {
    let max_age = time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(frontend_url.starts_with("https://"))
        .max_age(max_age)
        .build()
}

/// Cookie that clears the session token.
pub fn removal_cookie(frontend_url: &str) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), frontend_url, Duration::ZERO);
    cookie.make_removal();
    cookie
}
