// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. Malformed values are fatal: the
//! server refuses to start rather than failing on the first request.

use crate::models::Address;
use std::env;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SCOPES: &str = "read_vehicle_info read_location control_security";
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
/// Ten years. Keeps token `exp` and cookie `Max-Age` arithmetic in range.
pub const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;
const MIN_SIGNING_KEY_BYTES: usize = 32;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Whether the platform should show simulated vehicles during login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartcarMode {
    Development,
    Production,
}

impl SmartcarMode {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            _ => Err(ConfigError::Invalid(
                "SMARTCAR_MODE",
                format!("expected 'development' or 'production', got '{}'", raw),
            )),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    // --- Smartcar ---
    /// OAuth client ID (UUID)
    pub smartcar_client_id: String,
    /// OAuth client secret (UUID)
    pub smartcar_client_secret: String,
    /// Redirect URI registered with the platform
    pub smartcar_redirect_uri: String,
    pub smartcar_mode: SmartcarMode,
    /// Requested permissions
    pub smartcar_scopes: Vec<String>,
    pub smartcar_auth_url: String,
    pub smartcar_token_url: String,
    pub smartcar_api_url: String,

    // --- Google Maps ---
    pub google_maps_api_key: String,
    pub distance_matrix_url: String,

    /// Origin for every delivery
    pub warehouse: Address,

    /// Where browser redirects land after login or on failure
    pub frontend_url: String,

    // --- Sessions ---
    /// HMAC key for session tokens and OAuth state (raw bytes)
    pub session_signing_key: Vec<u8>,
    pub session_ttl: Duration,

    /// Timeout applied to every external call
    pub http_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("smartcar_client_id", &self.smartcar_client_id)
            .field("smartcar_redirect_uri", &self.smartcar_redirect_uri)
            .field("smartcar_mode", &self.smartcar_mode)
            .field("smartcar_scopes", &self.smartcar_scopes)
            .field("frontend_url", &self.frontend_url)
            .field("session_ttl", &self.session_ttl)
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = parse_or("PORT", DEFAULT_PORT)?;

        let smartcar_client_id = require_uuid("SMARTCAR_CLIENT_ID")?;
        let smartcar_client_secret = require_uuid("SMARTCAR_SECRET")?;

        let smartcar_redirect_uri = env::var("SMARTCAR_REDIRECT_URI")
            .unwrap_or_else(|_| format!("http://localhost:{}/callback", port));
        let smartcar_mode = match env::var("SMARTCAR_MODE") {
            Ok(raw) => SmartcarMode::parse(raw.trim())?,
            Err(_) => SmartcarMode::Production,
        };
        let smartcar_scopes = split_scopes(
            &env::var("SMARTCAR_SCOPES").unwrap_or_else(|_| DEFAULT_SCOPES.to_string()),
        );

        let warehouse = Address {
            street: env::var("WAREHOUSE_STREET")
                .unwrap_or_else(|_| "1355 Market St #900".to_string()),
            city: env::var("WAREHOUSE_CITY").unwrap_or_else(|_| "San Francisco".to_string()),
            region: env::var("WAREHOUSE_REGION").unwrap_or_else(|_| "CA".to_string()),
            postal_code: env::var("WAREHOUSE_POSTAL_CODE")
                .unwrap_or_else(|_| "94103".to_string()),
        };

        Ok(Self {
            port,
            smartcar_client_id,
            smartcar_client_secret,
            smartcar_redirect_uri,
            smartcar_mode,
            smartcar_scopes,
            smartcar_auth_url: env::var("SMARTCAR_AUTH_URL")
                .unwrap_or_else(|_| "https://connect.smartcar.com/oauth/authorize".to_string()),
            smartcar_token_url: env::var("SMARTCAR_TOKEN_URL")
                .unwrap_or_else(|_| "https://auth.smartcar.com/oauth/token".to_string()),
            smartcar_api_url: env::var("SMARTCAR_API_URL")
                .unwrap_or_else(|_| "https://api.smartcar.com/v2.0".to_string()),
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_MAPS_API_KEY"))?,
            distance_matrix_url: env::var("DISTANCE_MATRIX_URL").unwrap_or_else(|_| {
                "https://maps.googleapis.com/maps/api/distancematrix/json".to_string()
            }),
            warehouse,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            session_signing_key: require_signing_key("SESSION_SIGNING_KEY")?,
            session_ttl: Duration::from_secs(session_ttl_secs()?),
            http_timeout: Duration::from_secs(parse_or(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }

    /// Deterministic configuration for tests. External URLs point at
    /// unroutable placeholders; tests replace them with mock servers.
    pub fn test_default() -> Self {
        Self {
            port: DEFAULT_PORT,
            smartcar_client_id: "3f1e5c1a-8d4b-4e0f-9a57-2b7c6d8e9f01".to_string(),
            smartcar_client_secret: "9b2d4f6a-1c3e-4a5b-8d7f-0e1a2b3c4d5e".to_string(),
            smartcar_redirect_uri: "http://localhost:8000/callback".to_string(),
            smartcar_mode: SmartcarMode::Development,
            smartcar_scopes: split_scopes(DEFAULT_SCOPES),
            smartcar_auth_url: "https://connect.smartcar.com/oauth/authorize".to_string(),
            smartcar_token_url: "http://127.0.0.1:9/oauth/token".to_string(),
            smartcar_api_url: "http://127.0.0.1:9".to_string(),
            google_maps_api_key: "test_maps_key".to_string(),
            distance_matrix_url: "http://127.0.0.1:9/maps/api/distancematrix/json".to_string(),
            warehouse: Address {
                street: "1355 Market St #900".to_string(),
                city: "San Francisco".to_string(),
                region: "CA".to_string(),
                postal_code: "94103".to_string(),
            },
            frontend_url: "http://localhost:8000".to_string(),
            session_signing_key: b"test_session_key_at_least_32_bytes!".to_vec(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            http_timeout: Duration::from_secs(5),
        }
    }

    /// Point Smartcar token and API calls at `base_url` (mock servers).
    pub fn with_smartcar_base_url(mut self, base_url: &str) -> Self {
        self.smartcar_token_url = format!("{}/oauth/token", base_url);
        self.smartcar_api_url = base_url.to_string();
        self
    }

    /// Point distance queries at `base_url` (mock servers).
    pub fn with_distance_matrix_base_url(mut self, base_url: &str) -> Self {
        self.distance_matrix_url = format!("{}/maps/api/distancematrix/json", base_url);
        self
    }
}

fn require_uuid(name: &'static str) -> Result<String, ConfigError> {
    let value = env::var(name).map_err(|_| ConfigError::Missing(name))?;
    let value = value.trim().to_string();
    Uuid::parse_str(&value).map_err(|_| {
        ConfigError::Invalid(
            name,
            "must be the UUID issued by the Smartcar developer dashboard".to_string(),
        )
    })?;
    Ok(value)
}

fn require_signing_key(name: &'static str) -> Result<Vec<u8>, ConfigError> {
    let key = env::var(name).map_err(|_| ConfigError::Missing(name))?;
    if key.len() < MIN_SIGNING_KEY_BYTES {
        return Err(ConfigError::Invalid(
            name,
            format!("must be at least {} bytes", MIN_SIGNING_KEY_BYTES),
        ));
    }
    Ok(key.into_bytes())
}

fn session_ttl_secs() -> Result<u64, ConfigError> {
    let secs = parse_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
    if secs == 0 || secs > MAX_SESSION_TTL_SECS {
        return Err(ConfigError::Invalid(
            "SESSION_TTL_SECS",
            format!("must be between 1 and {}", MAX_SESSION_TTL_SECS),
        ));
    }
    Ok(secs)
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, format!("cannot parse '{}'", raw))),
        Err(_) => Ok(default),
    }
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split([' ', ','])
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
