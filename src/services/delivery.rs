// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Delivery decision: drop the package at home or at the vehicle.
//!
//! Steps, each attempted once:
//! 1. fetch the vehicle's live location
//! 2. one Distance Matrix query, warehouse -> [home, vehicle]
//! 3. pick the destination with the shorter drive *duration*
//!
//! A failure in step 1 ends the decision before any distance query is
//! issued.

use crate::error::AppError;
use crate::models::{Address, Credential, DeliveryOutcome, Destination, VehicleSummary};
use crate::services::distance_matrix::DistanceMatrixClient;
use crate::services::smartcar::SmartcarClient;

const LOCATION_FALLBACK: &str = "Failed to get vehicle location.";
const DISTANCE_FALLBACK: &str = "Failed to get drive durations.";

/// Decision rule. Only duration counts; distance is informational.
/// Ties go to home.
pub fn choose_destination(home_secs: u64, vehicle_secs: u64) -> Destination {
    if vehicle_secs < home_secs {
        Destination::Vehicle
    } else {
        Destination::Home
    }
}

#[derive(Clone)]
pub struct DeliveryDecision {
    smartcar: SmartcarClient,
    distance: DistanceMatrixClient,
}

impl DeliveryDecision {
    pub fn new(smartcar: SmartcarClient, distance: DistanceMatrixClient) -> Self {
        Self { smartcar, distance }
    }

    pub async fn decide(
        &self,
        vehicle: &VehicleSummary,
        credential: &Credential,
        home: &Address,
        warehouse: &Address,
    ) -> Result<DeliveryOutcome, AppError> {
        let location = self
            .smartcar
            .get_vehicle_location(&credential.access_token, &vehicle.id)
            .await
            .map_err(|e| {
                tracing::warn!(vehicle_id = %vehicle.id, error = %e, "Location fetch failed");
                AppError::LocationFetch {
                    message: e.message_or(LOCATION_FALLBACK),
                    action: AppError::LOCATION_ACTION,
                }
            })?;

        tracing::debug!(vehicle_id = %vehicle.id, "Vehicle located, querying drive durations");

        let destinations = [home.to_string(), location.to_string()];
        let estimates = self
            .distance
            .durations_from(&warehouse.to_string(), &destinations)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Distance Matrix query failed");
                AppError::DistanceQuery {
                    message: e.message_or(DISTANCE_FALLBACK),
                    action: AppError::DISTANCE_ACTION,
                }
            })?;

        let [home_estimate, vehicle_estimate]: [_; 2] =
            estimates.try_into().map_err(|_| AppError::DistanceQuery {
                message: DISTANCE_FALLBACK.to_string(),
                action: AppError::DISTANCE_ACTION,
            })?;

        let destination =
            choose_destination(home_estimate.duration_secs, vehicle_estimate.duration_secs);

        tracing::info!(
            vehicle_id = %vehicle.id,
            home_secs = home_estimate.duration_secs,
            vehicle_secs = vehicle_estimate.duration_secs,
            destination = ?destination,
            "Delivery destination decided"
        );

        Ok(DeliveryOutcome {
            destination,
            home: home_estimate,
            vehicle: vehicle_estimate,
            vehicle_location: location,
        })
    }
}
