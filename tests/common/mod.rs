// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{Duration, Utc};
use serde_json::json;
use smartcar_delivery::config::Config;
use smartcar_delivery::middleware::auth::{create_session_token, SESSION_COOKIE};
use smartcar_delivery::models::{Address, Credential, VehicleSummary};
use smartcar_delivery::routes::create_router;
use smartcar_delivery::services::SessionId;
use smartcar_delivery::AppState;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "test-access-token";
pub const VEHICLE_ID: &str = "36ab27d0-fd9d-4455-823a-ce30af709ffc";

/// Config with Smartcar and Distance Matrix both pointed at `server`.
#[allow(dead_code)]
pub fn mock_config(server: &MockServer) -> Config {
    Config::test_default()
        .with_smartcar_base_url(&server.uri())
        .with_distance_matrix_base_url(&server.uri())
}

/// Create a test app backed by `server`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::from_config(mock_config(server)).expect("state"));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn credential(config: &Config) -> Credential {
    Credential {
        access_token: ACCESS_TOKEN.to_string(),
        refresh_token: "test-refresh-token".to_string(),
        expires_at: Utc::now() + Duration::hours(2),
        refresh_expires_at: None,
        client_id: config.smartcar_client_id.clone(),
    }
}

#[allow(dead_code)]
pub fn vehicle(id: &str) -> VehicleSummary {
    VehicleSummary {
        id: id.to_string(),
        make: "TESLA".to_string(),
        model: "Model S".to_string(),
        year: 2014,
        extra: Default::default(),
    }
}

#[allow(dead_code)]
pub fn home_address() -> Address {
    Address {
        street: "200 Larkin St".to_string(),
        city: "San Francisco".to_string(),
        region: "CA".to_string(),
        postal_code: "94102".to_string(),
    }
}

/// Session with a credential and `VEHICLE_ID` selected.
/// Returns the session ID and a Cookie header value for it.
#[allow(dead_code)]
pub fn authorized_session(state: &AppState, address: Option<Address>) -> (SessionId, String) {
    let id = state.sessions.create();
    state
        .sessions
        .update(id, |s| {
            s.authorize(credential(&state.config));
            s.set_vehicles([(VEHICLE_ID.to_string(), vehicle(VEHICLE_ID))].into());
            s.address = address;
        })
        .unwrap();

    (id, session_cookie_header(state, id))
}

#[allow(dead_code)]
pub fn session_cookie_header(state: &AppState, id: SessionId) -> String {
    let token = create_session_token(
        id,
        &state.config.session_signing_key,
        state.config.session_ttl,
    )
    .unwrap();
    format!("{}={}", SESSION_COOKIE, token)
}

/// Smartcar location endpoint for `vehicle_id`.
#[allow(dead_code)]
pub async fn mount_location(server: &MockServer, vehicle_id: &str, lat: f64, lng: f64) {
    Mock::given(method("GET"))
        .and(path(format!("/vehicles/{}/location", vehicle_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": lat,
            "longitude": lng
        })))
        .mount(server)
        .await;
}

/// Distance Matrix answer with one row and elements [home, vehicle].
#[allow(dead_code)]
pub fn matrix_body(home_secs: u64, vehicle_secs: u64) -> serde_json::Value {
    json!({
        "status": "OK",
        "origin_addresses": ["1355 Market St #900, San Francisco, CA 94103, USA"],
        "destination_addresses": [
            "200 Larkin St, San Francisco, CA 94102, USA",
            "Post St & Mason St, San Francisco, CA 94108, USA"
        ],
        "rows": [{
            "elements": [
                {
                    "status": "OK",
                    "distance": {"text": "1.9 km", "value": 1900},
                    "duration": {"text": "", "value": home_secs}
                },
                {
                    "status": "OK",
                    "distance": {"text": "1.2 km", "value": 1200},
                    "duration": {"text": "", "value": vehicle_secs}
                }
            ]
        }]
    })
}

/// Distance Matrix endpoint expecting exactly `calls` requests.
#[allow(dead_code)]
pub async fn mount_matrix(server: &MockServer, home_secs: u64, vehicle_secs: u64, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/maps/api/distancematrix/json"))
        .and(query_param("mode", "driving"))
        .respond_with(ResponseTemplate::new(200).set_body_json(matrix_body(home_secs, vehicle_secs)))
        .expect(calls)
        .mount(server)
        .await;
}

/// Smartcar token endpoint accepting any code.
#[allow(dead_code)]
pub async fn mount_token_exchange(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 7200,
            "refresh_token": "test-refresh-token",
            "refresh_expires_in": 5184000
        })))
        .mount(server)
        .await;
}
