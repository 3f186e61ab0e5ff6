// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - external clients and the delivery flows.

pub mod authorization;
pub mod commands;
pub mod delivery;
pub mod distance_matrix;
pub mod session;
pub mod smartcar;
pub mod upstream;

pub use authorization::AuthorizationFlow;
pub use commands::VehicleCommands;
pub use delivery::DeliveryDecision;
pub use distance_matrix::DistanceMatrixClient;
pub use session::{SessionId, SessionStore};
pub use smartcar::SmartcarClient;
pub use upstream::UpstreamError;
