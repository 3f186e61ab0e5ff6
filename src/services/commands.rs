// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Direct vehicle commands (lock, unlock, locate).

use crate::error::AppError;
use crate::models::{Credential, LocationFix, VehicleCommand, VehicleSummary};
use crate::services::smartcar::SmartcarClient;

/// Pass-through commands; one attempt, failures propagate.
#[derive(Clone)]
pub struct VehicleCommands {
    client: SmartcarClient,
}

impl VehicleCommands {
    pub fn new(client: SmartcarClient) -> Self {
        Self { client }
    }

    pub async fn lock(
        &self,
        vehicle: &VehicleSummary,
        credential: &Credential,
    ) -> Result<(), AppError> {
        self.send(vehicle, credential, VehicleCommand::Lock).await
    }

    pub async fn unlock(
        &self,
        vehicle: &VehicleSummary,
        credential: &Credential,
    ) -> Result<(), AppError> {
        self.send(vehicle, credential, VehicleCommand::Unlock).await
    }

    pub async fn location(
        &self,
        vehicle: &VehicleSummary,
        credential: &Credential,
    ) -> Result<LocationFix, AppError> {
        self.client
            .get_vehicle_location(&credential.access_token, &vehicle.id)
            .await
            .map_err(|e| AppError::LocationFetch {
                message: e.message_or("Failed to get vehicle location."),
                action: AppError::LOCATION_ACTION,
            })
    }

    async fn send(
        &self,
        vehicle: &VehicleSummary,
        credential: &Credential,
        command: VehicleCommand,
    ) -> Result<(), AppError> {
        self.client
            .send_security_command(&credential.access_token, &vehicle.id, command)
            .await
            .map_err(|e| {
                tracing::warn!(vehicle_id = %vehicle.id, ?command, error = %e, "Vehicle command failed");
                AppError::Command {
                    message: e.message_or(&format!("Failed {}.", command.step())),
                    action: command.step(),
                }
            })?;

        tracing::info!(vehicle_id = %vehicle.id, ?command, "Vehicle command succeeded");
        Ok(())
    }
}
