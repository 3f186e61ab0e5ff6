// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Distance Matrix client.
//!
//! One origin, any number of destinations, always a single request.

use crate::config::Config;
use crate::models::DurationEstimate;
use crate::services::upstream::{check_response_json, UpstreamError};
use serde::Deserialize;

/// Distance Matrix API client (driving, metric).
#[derive(Clone)]
pub struct DistanceMatrixClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl DistanceMatrixClient {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            url: config.distance_matrix_url.clone(),
            api_key: config.google_maps_api_key.clone(),
        }
    }

    /// Driving estimates from `origin` to each destination, in the same
    /// order as `destinations`.
    ///
    /// Origins and destinations are free-form addresses or "lat,lng".
    pub async fn durations_from(
        &self,
        origin: &str,
        destinations: &[String],
    ) -> Result<Vec<DurationEstimate>, UpstreamError> {
        let joined = destinations.join("|");
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("origins", origin),
                ("destinations", joined.as_str()),
                ("mode", "driving"),
                ("units", "metric"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let matrix: MatrixResponse = check_response_json(response).await?;
        matrix.into_estimates(destinations)
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    destination_addresses: Vec<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    #[serde(default)]
    distance: Option<MatrixValue>,
    #[serde(default)]
    duration: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: u64,
}

impl MatrixResponse {
    fn into_estimates(self, requested: &[String]) -> Result<Vec<DurationEstimate>, UpstreamError> {
        if self.status != "OK" {
            return Err(UpstreamError::Rejected(
                self.error_message
                    .unwrap_or_else(|| format!("Distance Matrix status {}", self.status)),
            ));
        }

        let row = self
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::Decode("response has no rows".to_string()))?;

        if row.elements.len() != requested.len() {
            return Err(UpstreamError::Decode(format!(
                "expected {} elements, got {}",
                requested.len(),
                row.elements.len()
            )));
        }

        row.elements
            .into_iter()
            .enumerate()
            .map(|(i, element)| {
                let destination = self
                    .destination_addresses
                    .get(i)
                    .filter(|d| !d.is_empty())
                    .cloned()
                    .unwrap_or_else(|| requested[i].clone());

                match (element.status.as_str(), element.duration, element.distance) {
                    ("OK", Some(duration), Some(distance)) => Ok(DurationEstimate {
                        destination,
                        duration_secs: duration.value,
                        distance_meters: distance.value,
                    }),
                    (status, _, _) => Err(UpstreamError::Rejected(format!(
                        "No driving route to {} ({})",
                        destination, status
                    ))),
                }
            })
            .collect()
    }
}
