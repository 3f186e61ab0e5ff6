// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Failures reported by external APIs, before a flow classifies them.

use serde::de::DeserializeOwned;
use std::time::Duration;

/// Error from a single external call.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    Status {
        status: u16,
        /// Message extracted from the error body, if any
        message: Option<String>,
    },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// The service answered but refused the query (e.g. no route).
    #[error("{0}")]
    Rejected(String),
}

impl UpstreamError {
    /// Message the upstream service gave for this failure, if any.
    pub fn upstream_message(&self) -> Option<String> {
        match self {
            UpstreamError::Status { message, .. } => message.clone(),
            UpstreamError::Rejected(message) => Some(message.clone()),
            UpstreamError::Transport(_) | UpstreamError::Decode(_) => None,
        }
    }

    /// Upstream message, or `fallback` when the service gave none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.upstream_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Build the HTTP client shared by every external call.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Check response status and return error if not successful.
pub async fn check_response(response: reqwest::Response) -> Result<(), UpstreamError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(status_error(response).await)
}

/// Check response and parse JSON body.
pub async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    if !response.status().is_success() {
        return Err(status_error(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

async fn status_error(response: reqwest::Response) -> UpstreamError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body);

    if status == 429 {
        tracing::warn!("Upstream rate limit hit (429)");
    }

    UpstreamError::Status { status, message }
}

/// Pull a readable message out of an error body. Smartcar uses
/// `description` (v2) or `message` (v1); OAuth endpoints use
/// `error_description`.
fn extract_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["description", "message", "error_description", "error"]
        .iter()
        .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
