// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-browser session state.

use crate::models::{Address, Credential, VehicleSummary};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// State owned by one browser session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Set by the authorization callback
    pub credential: Option<Credential>,
    /// Authorized vehicles keyed by vehicle ID
    pub vehicles: HashMap<String, VehicleSummary>,
    /// Vehicle used for delivery decisions
    pub selected_vehicle: Option<String>,
    /// Delivery address from the form
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            credential: None,
            vehicles: HashMap::new(),
            selected_vehicle: None,
            address: None,
            created_at: now,
            last_seen: now,
        }
    }

    /// Attach a fresh credential. Vehicles from a previous authorization
    /// are discarded since they may no longer be accessible.
    pub fn authorize(&mut self, credential: Credential) {
        self.credential = Some(credential);
        self.vehicles.clear();
        self.selected_vehicle = None;
    }

    /// Replace the vehicle mapping, keeping the selection if it survived
    /// and otherwise selecting the first vehicle.
    pub fn set_vehicles(&mut self, vehicles: HashMap<String, VehicleSummary>) {
        let keep = self
            .selected_vehicle
            .as_ref()
            .is_some_and(|id| vehicles.contains_key(id));
        if !keep {
            self.selected_vehicle = vehicles.keys().min().cloned();
        }
        self.vehicles = vehicles;
    }

    pub fn selected(&self) -> Option<&VehicleSummary> {
        self.selected_vehicle
            .as_ref()
            .and_then(|id| self.vehicles.get(id))
    }
}
