// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Smartcar delivery: choose whether to deliver a package to the customer's
//! home or to their car.
//!
//! This crate provides the backend API that authorizes access to a user's
//! vehicles through Smartcar and compares drive durations from the warehouse
//! using the Google Distance Matrix API.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{
    upstream::build_http_client, AuthorizationFlow, DeliveryDecision, DistanceMatrixClient,
    SessionStore, SmartcarClient, VehicleCommands,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub authorization: AuthorizationFlow,
    pub delivery: DeliveryDecision,
    pub commands: VehicleCommands,
}

impl AppState {
    /// Wire up clients and flows. All external calls share one HTTP client
    /// with the configured timeout.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let http = build_http_client(config.http_timeout)?;

        let smartcar = SmartcarClient::new(&config, http.clone());
        let distance = DistanceMatrixClient::new(&config, http);

        Ok(Self {
            sessions: SessionStore::new(config.session_ttl),
            authorization: AuthorizationFlow::new(smartcar.clone()),
            delivery: DeliveryDecision::new(smartcar.clone(), distance),
            commands: VehicleCommands::new(smartcar),
            config,
        })
    }
}
