// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Delivery decision models.

use crate::models::LocationFix;
use serde::Serialize;

/// Where the package should be dropped off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Home,
    Vehicle,
}

/// Drive estimate from the warehouse to one destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationEstimate {
    /// Destination as resolved by the mapping service
    pub destination: String,
    /// Drive time in seconds
    pub duration_secs: u64,
    /// Drive distance in meters (informational only)
    pub distance_meters: u64,
}

/// Result of a delivery decision plus the data it was based on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryOutcome {
    pub destination: Destination,
    pub home: DurationEstimate,
    pub vehicle: DurationEstimate,
    pub vehicle_location: LocationFix,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Destination::Home).unwrap(), "home");
        assert_eq!(
            serde_json::to_value(Destination::Vehicle).unwrap(),
            "vehicle"
        );
    }
}
