// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Access credential returned by the authorization code exchange.

use chrono::{DateTime, Utc};

/// OAuth credential for vehicle-data calls.
///
/// Lives only in the in-memory session store. Not `Serialize`; `Debug`
/// redacts both tokens.
#[derive(Clone)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
    /// When the refresh token expires, if the platform reported it
    pub refresh_expires_at: Option<DateTime<Utc>>,
    /// Client ID the credential was issued to
    pub client_id: String,
}

impl Credential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .field("client_id", &self.client_id)
            .finish()
    }
}
