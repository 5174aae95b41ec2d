//! Watering threshold configuration.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Percentage, ValidationError};

/// Threshold set the advisor compares readings against.
///
/// Defaults suit common houseplants; per-species sets can be supplied by
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WateringThresholds {
    /// Soil moisture at or below this is dry: water immediately.
    pub soil_dry: Percentage,

    /// Soil moisture at or below this (but above `soil_dry`) is the
    /// warning band.
    pub soil_low: Percentage,

    /// Air temperature above this accelerates drying.
    pub hot_temperature_c: f64,

    /// Air humidity below this accelerates drying.
    pub dry_air_humidity: Percentage,
}

impl WateringThresholds {
    /// Validates internal consistency of the threshold set.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the dry threshold is not strictly
    /// below the warning threshold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.soil_dry >= self.soil_low {
            return Err(ValidationError::invalid_format(
                "soil_dry",
                "must be strictly below soil_low",
            ));
        }
        Ok(())
    }
}

impl Default for WateringThresholds {
    fn default() -> Self {
        Self {
            soil_dry: Percentage::new(30),
            soil_low: Percentage::new(45),
            hot_temperature_c: 32.0,
            dry_air_humidity: Percentage::new(40),
        }
    }
}
