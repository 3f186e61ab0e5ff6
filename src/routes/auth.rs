// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Smartcar OAuth routes and the delivery address form.

use axum::{
    extract::{FromRequest, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    create_session_token, removal_cookie, session_cookie, session_from_jar,
};
use crate::models::Address;
use crate::services::session::SessionId;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// How long a login link stays valid.
const OAUTH_STATE_MAX_AGE_MS: u128 = 15 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/address", post(submit_address))
        .route("/auth/start", get(auth_start))
        .route("/callback", get(auth_callback))
        .route("/auth/logout", post(logout))
}

/// Landing data for the delivery page.
#[derive(Serialize)]
pub struct HomeResponse {
    pub auth_url: String,
    pub authorized: bool,
    pub address: Option<Address>,
}

/// Return the login URL for the current (possibly new) session.
async fn home(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<impl IntoResponse> {
    let (jar, session_id) = ensure_session(&state, jar)?;
    let auth_url = signed_authorization_url(&state, session_id)?;
    let session = state.sessions.get(session_id)?;

    Ok((
        jar,
        Json(HomeResponse {
            auth_url,
            authorized: session.credential.is_some(),
            address: session.address,
        }),
    ))
}

/// Store the delivery address, then send the user to Smartcar.
async fn submit_address(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
) -> Result<impl IntoResponse> {
    let address = address_from_body(request).await?.normalized();
    address
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid address: {}", e)))?;

    let (jar, session_id) = ensure_session(&state, jar)?;
    state
        .sessions
        .update(session_id, |s| s.address = Some(address))?;

    tracing::info!(session_id = %session_id, "Delivery address stored");

    let auth_url = signed_authorization_url(&state, session_id)?;
    Ok((jar, Redirect::to(&auth_url)))
}

/// Address from a JSON body or an urlencoded form, by `Content-Type`.
async fn address_from_body(request: Request) -> Result<Address> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if is_json {
        let Json(address) = Json::<Address>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(address)
    } else {
        let Form(address) = Form::<Address>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(address)
    }
}

/// Start OAuth flow - redirect to Smartcar Connect.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    let (jar, session_id) = ensure_session(&state, jar)?;
    let auth_url = signed_authorization_url(&state, session_id)?;

    tracing::info!(
        client_id = %state.config.smartcar_client_id,
        "Starting OAuth flow, redirecting to Smartcar"
    );

    Ok((jar, Redirect::temporary(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for a credential and attach it to the
/// session named in the signed `state`.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse> {
    let code = match params.code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => {
            if let Some(error) = params.error {
                tracing::warn!(error = %error, "OAuth callback without code");
            }
            return Ok((jar, Redirect::temporary("/")).into_response());
        }
    };

    let frontend_url = state.config.frontend_url.clone();

    let Some(session_id) = params
        .state
        .as_deref()
        .and_then(|s| verify_and_decode_state(s, &state.config.session_signing_key))
    else {
        return Ok(redirect_to_error(
            &frontend_url,
            "Login link is invalid or has expired",
            "verifying login request",
        )
        .into_response());
    };

    // The session may have expired while the user was at Smartcar.
    let session_id = if state.sessions.contains(session_id) {
        session_id
    } else {
        state.sessions.create()
    };

    let credential = match state.authorization.exchange_code(&code).await {
        Ok(credential) => credential,
        Err(e) => {
            let (message, action) = e
                .report()
                .unwrap_or(("Login failed", AppError::EXCHANGE_ACTION));
            return Ok(redirect_to_error(&frontend_url, message, action).into_response());
        }
    };

    state
        .sessions
        .update(session_id, |s| s.authorize(credential))?;

    tracing::info!(session_id = %session_id, "OAuth successful, credential attached to session");

    let token = create_session_token(
        session_id,
        &state.config.session_signing_key,
        state.config.session_ttl,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;

    let jar = jar.add(session_cookie(token, &frontend_url, state.config.session_ttl));
    let redirect = Redirect::temporary(&format!("{}/market", frontend_url));

    Ok((jar, redirect).into_response())
}

/// Logout - drop the session and clear the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(id) = session_from_jar(&state, &jar) {
        state.sessions.remove(id);
    }
    let jar = jar.add(removal_cookie(&state.config.frontend_url));
    (jar, StatusCode::NO_CONTENT)
}

/// Reuse the cookie's session if it is still live, otherwise start one.
pub(crate) fn ensure_session(state: &AppState, jar: CookieJar) -> Result<(CookieJar, SessionId)> {
    if let Some(id) = session_from_jar(state, &jar) {
        return Ok((jar, id));
    }

    let id = state.sessions.create();
    let token = create_session_token(id, &state.config.session_signing_key, state.config.session_ttl)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;
    let jar = jar.add(session_cookie(
        token,
        &state.config.frontend_url,
        state.config.session_ttl,
    ));
    Ok((jar, id))
}

fn signed_authorization_url(state: &AppState, session_id: SessionId) -> Result<String> {
    let oauth_state = sign_state(session_id, &state.config.session_signing_key)?;
    Ok(state
        .authorization
        .build_authorization_url(Some(&oauth_state)))
}

/// Send the browser to the generic failure page.
fn redirect_to_error(frontend_url: &str, message: &str, action: &str) -> Redirect {
    Redirect::temporary(&format!(
        "{}/error?message={}&action={}",
        frontend_url,
        urlencoding::encode(message),
        urlencoding::encode(action)
    ))
}

/// Encode "session_id|timestamp_hex|signature_hex" as URL-safe base64.
fn sign_state(session_id: SessionId, secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{}|{:x}", session_id, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature).as_bytes()))
}

/// Verify HMAC signature and age, and decode the session ID from the state.
fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<SessionId> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let (session_id, timestamp_hex, signature_hex) = (parts[0], parts[1], parts[2]);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(format!("{}|{}", session_id, timestamp_hex).as_bytes());
    let signature = hex::decode(signature_hex).ok()?;
    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued_ms = u128::from_str_radix(timestamp_hex, 16).ok()?;
    let now_ms = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_millis();
    if now_ms.saturating_sub(issued_ms) > OAUTH_STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    session_id.parse().ok()
}
