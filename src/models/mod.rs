// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod address;
pub mod credential;
pub mod delivery;
pub mod session;
pub mod vehicle;

pub use address::Address;
pub use credential::Credential;
pub use delivery::{DeliveryOutcome, Destination, DurationEstimate};
pub use session::Session;
pub use vehicle::{LocationFix, VehicleCommand, VehicleSummary};
