// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Smartcar API client.
//!
//! Handles:
//! - Building the Connect authorization URL
//! - Exchanging an authorization code for tokens
//! - Vehicle enumeration, info and location
//! - Lock/unlock security commands
//!
//! Every call is attempted once; failures are returned as `UpstreamError`
//! for the calling flow to classify.

use crate::config::{Config, SmartcarMode};
use crate::models::{LocationFix, VehicleCommand, VehicleSummary};
use crate::services::upstream::{check_response, check_response_json, UpstreamError};
use serde::Deserialize;

/// Smartcar API client.
#[derive(Clone)]
pub struct SmartcarClient {
    http: reqwest::Client,
    auth_url: String,
    token_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    mode: SmartcarMode,
}

impl SmartcarClient {
    /// Create a new Smartcar client from configuration.
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            auth_url: config.smartcar_auth_url.clone(),
            token_url: config.smartcar_token_url.clone(),
            api_url: config.smartcar_api_url.trim_end_matches('/').to_string(),
            client_id: config.smartcar_client_id.clone(),
            client_secret: config.smartcar_client_secret.clone(),
            redirect_uri: config.smartcar_redirect_uri.clone(),
            scopes: config.smartcar_scopes.clone(),
            mode: config.smartcar_mode,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Connect URL the user visits to grant access. Pure function of the
    /// client configuration plus the optional opaque `state`.
    pub fn authorization_url(&self, state: Option<&str>) -> String {
        let mode = match self.mode {
            SmartcarMode::Development => "test",
            SmartcarMode::Production => "live",
        };

        let mut url = format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&mode={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scopes.join(" ")),
            mode,
        );
        if let Some(state) = state {
            url.push_str("&state=");
            url.push_str(&urlencoding::encode(state));
        }
        url
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, UpstreamError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        check_response_json(response).await
    }

    /// List the IDs of every vehicle the token grants access to.
    pub async fn list_vehicle_ids(&self, access_token: &str) -> Result<Vec<String>, UpstreamError> {
        let url = format!("{}/vehicles", self.api_url);
        let body: VehicleIdsResponse = self.get_json(&url, access_token).await?;
        Ok(body.vehicles)
    }

    /// Get make, model and year of a vehicle.
    pub async fn get_vehicle_info(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> Result<VehicleSummary, UpstreamError> {
        let url = format!("{}/vehicles/{}", self.api_url, vehicle_id);
        self.get_json(&url, access_token).await
    }

    /// Get the vehicle's current position.
    pub async fn get_vehicle_location(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> Result<LocationFix, UpstreamError> {
        let url = format!("{}/vehicles/{}/location", self.api_url, vehicle_id);
        self.get_json(&url, access_token).await
    }

    /// Send a lock or unlock command.
    pub async fn send_security_command(
        &self,
        access_token: &str,
        vehicle_id: &str,
        command: VehicleCommand,
    ) -> Result<(), UpstreamError> {
        let url = format!("{}/vehicles/{}/security", self.api_url, vehicle_id);

        let body = serde_json::json!({
            "action": command.api_action()
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        check_response(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, UpstreamError> {
        let response = self.http.get(url).bearer_auth(access_token).send().await?;
        check_response_json(response).await
    }
}

/// Token exchange response from Smartcar OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
    /// Lifetime of the refresh token in seconds
    #[serde(default)]
    pub refresh_expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct VehicleIdsResponse {
    vehicles: Vec<String>,
}
