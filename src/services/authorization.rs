// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization flow: code exchange and vehicle enumeration.

use crate::error::AppError;
use crate::models::{Credential, VehicleSummary};
use crate::services::smartcar::SmartcarClient;
use chrono::{DateTime, Duration, Utc};
use futures_util::future::try_join_all;
use std::collections::HashMap;

const EXCHANGE_FALLBACK: &str = "Failed to exchange authorization code for access token";
const VEHICLE_INFO_FALLBACK: &str = "Failed to get vehicle info.";

/// Turns an authorization code into a credential and the user's vehicles.
///
/// Holds no per-user state; the caller attaches the results to a session.
#[derive(Clone)]
pub struct AuthorizationFlow {
    client: SmartcarClient,
}

impl AuthorizationFlow {
    pub fn new(client: SmartcarClient) -> Self {
        Self { client }
    }

    /// URL that starts the login. `state` is echoed back on the callback.
    pub fn build_authorization_url(&self, state: Option<&str>) -> String {
        self.client.authorization_url(state)
    }

    /// Exchange the one-time code from the callback for a credential.
    ///
    /// Callers treat a missing code as a fresh login, not as an error,
    /// and should not call this with an empty code.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::AuthExchange {
                message: "Authorization code is empty".to_string(),
                action: AppError::EXCHANGE_ACTION,
            });
        }

        tracing::info!("Exchanging authorization code for tokens");

        let tokens = self.client.exchange_code(code).await.map_err(|e| {
            tracing::warn!(error = %e, "Smartcar token exchange failed");
            AppError::AuthExchange {
                message: e.message_or(EXCHANGE_FALLBACK),
                action: AppError::EXCHANGE_ACTION,
            }
        })?;

        if tokens.access_token.is_empty() {
            return Err(AppError::AuthExchange {
                message: "Smartcar returned an empty access token".to_string(),
                action: AppError::EXCHANGE_ACTION,
            });
        }

        let now = Utc::now();
        let expires_at = expiry_after(now, tokens.expires_in)?;
        let refresh_expires_at = tokens
            .refresh_expires_in
            .map(|secs| expiry_after(now, secs))
            .transpose()?;

        Ok(Credential {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at,
            refresh_expires_at,
            client_id: self.client.client_id().to_string(),
        })
    }

    /// Enumerate authorized vehicles and fetch info for each concurrently.
    ///
    /// All-or-nothing: the first failing call aborts the rest and no
    /// partial mapping is returned.
    pub async fn list_vehicles(
        &self,
        credential: &Credential,
    ) -> Result<HashMap<String, VehicleSummary>, AppError> {
        let token = credential.access_token.as_str();

        let ids = self
            .client
            .list_vehicle_ids(token)
            .await
            .map_err(vehicle_info_error)?;

        tracing::debug!(count = ids.len(), "Fetching vehicle info");

        let vehicles = try_join_all(ids.iter().map(|id| async move {
            self.client
                .get_vehicle_info(token, id)
                .await
                .map(|mut info| {
                    // Key by the ID we asked for, whatever the body says.
                    info.id = id.clone();
                    info
                })
                .map_err(|e| {
                    tracing::warn!(vehicle_id = %id, error = %e, "Vehicle info fetch failed");
                    e
                })
        }))
        .await
        .map_err(vehicle_info_error)?;

        Ok(vehicles
            .into_iter()
            .map(|vehicle| (vehicle.id.clone(), vehicle))
            .collect())
    }
}

/// `now + secs`, rejecting lifetimes chrono cannot represent.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Result<DateTime<Utc>, AppError> {
    Duration::try_seconds(secs)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| AppError::AuthExchange {
            message: format!("Smartcar returned an invalid token lifetime ({}s)", secs),
            action: AppError::EXCHANGE_ACTION,
        })
}

fn vehicle_info_error(e: crate::services::upstream::UpstreamError) -> AppError {
    AppError::VehicleInfo {
        message: e.message_or(VEHICLE_INFO_FALLBACK),
        action: AppError::VEHICLE_INFO_ACTION,
    }
}
