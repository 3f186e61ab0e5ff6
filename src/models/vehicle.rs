// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Vehicle models returned by the Smartcar API.

use serde::{Deserialize, Serialize};

/// Descriptive record for one authorized vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    /// Smartcar vehicle ID (opaque, immutable)
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    /// Any additional descriptive fields the API returns
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Vehicle position at query time. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// "lat,lng", the coordinate form accepted as a distance destination.
impl std::fmt::Display for LocationFix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Security commands that can be sent to a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleCommand {
    Lock,
    Unlock,
}

impl VehicleCommand {
    /// Value of the `action` field in the security request body.
    pub fn api_action(self) -> &'static str {
        match self {
            VehicleCommand::Lock => "LOCK",
            VehicleCommand::Unlock => "UNLOCK",
        }
    }

    /// Step label used in user-facing error reports.
    pub fn step(self) -> &'static str {
        match self {
            VehicleCommand::Lock => "locking vehicle",
            VehicleCommand::Unlock => "unlocking vehicle",
        }
    }
}
