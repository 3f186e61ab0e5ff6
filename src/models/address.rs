// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Free-form postal address captured from the delivery form.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A postal address. Only presence of each field is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    /// Street line, e.g. "200 Larkin St"
    #[serde(alias = "address")]
    #[validate(length(min = 1, message = "street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    /// State or province
    #[serde(alias = "state")]
    #[validate(length(min = 1, message = "region is required"))]
    pub region: String,
    #[serde(alias = "zipcode")]
    #[validate(length(min = 1, message = "postal code is required"))]
    pub postal_code: String,
}

impl Address {
    /// Trim surrounding whitespace so blank fields fail validation.
    pub fn normalized(self) -> Self {
        Self {
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            region: self.region.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
        }
    }
}

/// Single-line form accepted by geocoding services:
/// "200 Larkin St, San Francisco, CA 94102".
impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {} {}",
            self.street, self.city, self.region, self.postal_code
        )
    }
}
