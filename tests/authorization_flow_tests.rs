// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization flow tests against a stub Smartcar service.

use serde_json::json;
use smartcar_delivery::config::Config;
use smartcar_delivery::error::AppError;
use smartcar_delivery::AppState;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn state_for(server: &MockServer) -> AppState {
    AppState::from_config(common::mock_config(server)).unwrap()
}

#[tokio::test]
async fn test_exchange_code_returns_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=good-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "token_type": "Bearer",
            "expires_in": 7200,
            "refresh_token": "fresh-refresh",
            "refresh_expires_in": 5184000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let credential = state.authorization.exchange_code("good-code").await.unwrap();

    assert_eq!(credential.access_token, "fresh-access");
    assert_eq!(credential.refresh_token, "fresh-refresh");
    assert!(!credential.is_expired(chrono::Utc::now()));
    assert!(credential.refresh_expires_at.is_some());
}

#[tokio::test]
async fn test_credential_references_authorization_url_client() {
    let server = MockServer::start().await;
    common::mount_token_exchange(&server).await;

    let state = state_for(&server);
    let url = state.authorization.build_authorization_url(None);
    let credential = state.authorization.exchange_code("code-from-redirect").await.unwrap();

    assert!(url.contains(&format!("client_id={}", credential.client_id)));
    assert_eq!(credential.client_id, state.config.smartcar_client_id);
}

#[tokio::test]
async fn test_exchange_code_rejected_uses_upstream_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid or expired auth code"
        })))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let err = state.authorization.exchange_code("used-code").await.unwrap_err();

    match err {
        AppError::AuthExchange { message, action } => {
            assert_eq!(message, "Invalid or expired auth code");
            assert_eq!(action, "exchanging authorization code for access token");
        }
        other => panic!("expected AuthExchange, got {:?}", other),
    }
}

#[tokio::test]
async fn test_exchange_code_network_failure_uses_fallback() {
    // Nothing listens on the discard port.
    let state = AppState::from_config(Config::test_default()).unwrap();
    let err = state.authorization.exchange_code("any").await.unwrap_err();

    assert!(matches!(
        err,
        AppError::AuthExchange { ref message, .. }
            if message == "Failed to exchange authorization code for access token"
    ));
}

#[tokio::test]
async fn test_exchange_empty_code_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let err = state.authorization.exchange_code("  ").await.unwrap_err();
    assert!(matches!(err, AppError::AuthExchange { .. }));
}

#[tokio::test]
async fn test_exchange_code_out_of_range_lifetime_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "token_type": "Bearer",
            "expires_in": 9_000_000_000_000_000i64,
            "refresh_token": "fresh-refresh",
            "refresh_expires_in": 5184000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server);
    let err = state.authorization.exchange_code("good-code").await.unwrap_err();

    match err {
        AppError::AuthExchange { message, action } => {
            assert!(message.contains("invalid token lifetime"));
            assert_eq!(action, "exchanging authorization code for access token");
        }
        other => panic!("expected AuthExchange, got {:?}", other),
    }
}

async fn mount_vehicle_ids(server: &MockServer, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/vehicles"))
        .and(header("authorization", "Bearer test-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vehicles": ids,
            "paging": {"count": ids.len(), "offset": 0}
        })))
        .mount(server)
        .await;
}

async fn mount_vehicle_info(server: &MockServer, id: &str, make: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/vehicles/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "make": make,
            "model": "Model",
            "year": 2019
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_vehicles_one_entry_per_id() {
    let server = MockServer::start().await;
    mount_vehicle_ids(&server, &["v1", "v2", "v3"]).await;
    mount_vehicle_info(&server, "v1", "TESLA").await;
    mount_vehicle_info(&server, "v2", "AUDI").await;
    mount_vehicle_info(&server, "v3", "BMW").await;

    let state = state_for(&server);
    let credential = common::credential(&state.config);
    let vehicles = state.authorization.list_vehicles(&credential).await.unwrap();

    assert_eq!(vehicles.len(), 3);
    assert_eq!(vehicles["v2"].make, "AUDI");
    assert_eq!(vehicles["v3"].year, 2019);
}

#[tokio::test]
async fn test_list_vehicles_is_all_or_nothing() {
    let server = MockServer::start().await;
    mount_vehicle_ids(&server, &["v1", "v2", "v3"]).await;
    mount_vehicle_info(&server, "v1", "TESLA").await;
    mount_vehicle_info(&server, "v3", "BMW").await;
    Mock::given(method("GET"))
        .and(path("/vehicles/v2"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "type": "UPSTREAM",
            "description": "Vehicle is unreachable"
        })))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let credential = common::credential(&state.config);
    let err = state.authorization.list_vehicles(&credential).await.unwrap_err();

    match err {
        AppError::VehicleInfo { message, action } => {
            assert_eq!(message, "Vehicle is unreachable");
            assert_eq!(action, "fetching vehicle info");
        }
        other => panic!("expected VehicleInfo, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_vehicles_id_listing_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vehicles"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let state = state_for(&server);
    let credential = common::credential(&state.config);
    let err = state.authorization.list_vehicles(&credential).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::VehicleInfo { ref message, .. } if message == "Failed to get vehicle info."
    ));
}

#[tokio::test]
async fn test_list_vehicles_empty() {
    let server = MockServer::start().await;
    mount_vehicle_ids(&server, &[]).await;

    let state = state_for(&server);
    let credential = common::credential(&state.config);
    let vehicles = state.authorization.list_vehicles(&credential).await.unwrap();
    assert!(vehicles.is_empty());
}
