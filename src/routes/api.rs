// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authorized sessions.

use crate::error::{AppError, Result};
use crate::middleware::auth::CurrentSession;
use crate::models::{Address, Credential, DeliveryOutcome, LocationFix, Session, VehicleSummary};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// API routes (require a session token).
/// The session middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/vehicles/{id}/select", post(select_vehicle))
        .route("/api/vehicles/{id}/location", get(get_location))
        .route("/api/vehicles/{id}/lock", post(lock_vehicle))
        .route("/api/vehicles/{id}/unlock", post(unlock_vehicle))
        .route("/api/delivery", post(decide_delivery))
}

/// Credential for the session, failing fast if the user never authorized
/// or the access token has expired.
fn require_credential(session: &Session) -> Result<Credential> {
    let credential = session.credential.clone().ok_or(AppError::Unauthorized)?;
    if credential.is_expired(Utc::now()) {
        return Err(AppError::Unauthorized);
    }
    Ok(credential)
}

/// A vehicle enumerated for this session. IDs from other sessions or
/// never listed are rejected.
fn known_vehicle(session: &Session, id: &str) -> Result<VehicleSummary> {
    session
        .vehicles
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {}", id)))
}

// ─── Session ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionResponse {
    pub authorized: bool,
    pub credential_expires_at: Option<DateTime<Utc>>,
    pub address: Option<Address>,
    pub selected_vehicle: Option<String>,
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<SessionResponse>> {
    let session = state.sessions.get(current.id)?;
    Ok(Json(SessionResponse {
        authorized: session.credential.is_some(),
        credential_expires_at: session.credential.as_ref().map(|c| c.expires_at),
        address: session.address,
        selected_vehicle: session.selected_vehicle,
    }))
}

// ─── Vehicles ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct VehiclesResponse {
    pub address: Option<Address>,
    /// Sorted by vehicle ID
    pub vehicles: Vec<VehicleSummary>,
    pub selected: Option<String>,
}

impl VehiclesResponse {
    fn from_session(session: Session) -> Self {
        let mut vehicles: Vec<VehicleSummary> = session.vehicles.into_values().collect();
        vehicles.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            address: session.address,
            vehicles,
            selected: session.selected_vehicle,
        }
    }
}

/// Re-enumerate the session's vehicles and store the result.
async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<VehiclesResponse>> {
    let credential = require_credential(&state.sessions.get(current.id)?)?;

    let vehicles = state.authorization.list_vehicles(&credential).await?;

    tracing::info!(
        session_id = %current.id,
        count = vehicles.len(),
        "Vehicles loaded"
    );

    let session = state.sessions.update(current.id, |s| {
        s.set_vehicles(vehicles);
        s.clone()
    })?;

    Ok(Json(VehiclesResponse::from_session(session)))
}

async fn select_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<Json<VehiclesResponse>> {
    let session = state.sessions.update(current.id, |s| {
        if !s.vehicles.contains_key(&id) {
            return None;
        }
        s.selected_vehicle = Some(id.clone());
        Some(s.clone())
    })?;

    let session = session.ok_or_else(|| AppError::NotFound(format!("Vehicle {}", id)))?;
    Ok(Json(VehiclesResponse::from_session(session)))
}

async fn get_location(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<Json<LocationFix>> {
    let session = state.sessions.get(current.id)?;
    let credential = require_credential(&session)?;
    let vehicle = known_vehicle(&session, &id)?;

    let location = state.commands.location(&vehicle, &credential).await?;
    Ok(Json(location))
}

// ─── Commands ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CommandResponse {
    pub vehicle_id: String,
    pub status: &'static str,
}

async fn lock_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<Json<CommandResponse>> {
    let session = state.sessions.get(current.id)?;
    let credential = require_credential(&session)?;
    let vehicle = known_vehicle(&session, &id)?;

    state.commands.lock(&vehicle, &credential).await?;
    Ok(Json(CommandResponse {
        vehicle_id: vehicle.id,
        status: "locked",
    }))
}

async fn unlock_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Result<Json<CommandResponse>> {
    let session = state.sessions.get(current.id)?;
    let credential = require_credential(&session)?;
    let vehicle = known_vehicle(&session, &id)?;

    state.commands.unlock(&vehicle, &credential).await?;
    Ok(Json(CommandResponse {
        vehicle_id: vehicle.id,
        status: "unlocked",
    }))
}

// ─── Delivery ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DeliveryResponse {
    pub vehicle_id: String,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

/// Decide where to deliver: the session's home address or its selected
/// vehicle, whichever is the shorter drive from the warehouse.
async fn decide_delivery(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<DeliveryResponse>> {
    let session = state.sessions.get(current.id)?;
    let credential = require_credential(&session)?;

    let home = session
        .address
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("No delivery address on file".to_string()))?;
    let vehicle = session
        .selected()
        .ok_or_else(|| AppError::BadRequest("No vehicle selected".to_string()))?;

    let outcome = state
        .delivery
        .decide(vehicle, &credential, home, &state.config.warehouse)
        .await?;

    Ok(Json(DeliveryResponse {
        vehicle_id: vehicle.id.clone(),
        outcome,
    }))
}
