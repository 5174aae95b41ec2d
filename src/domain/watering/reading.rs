//! Sensor reading value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Percentage, ValidationError};

/// Lowest temperature the supported sensors can report, in Celsius.
const TEMPERATURE_MIN_C: f64 = -40.0;

/// Highest temperature the supported sensors can report, in Celsius.
const TEMPERATURE_MAX_C: f64 = 60.0;

/// A single reading from a plant's sensor pod.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Relative soil moisture.
    pub soil_moisture: Percentage,

    /// Air temperature in Celsius.
    pub temperature_c: f64,

    /// Relative air humidity.
    pub humidity: Percentage,
}

impl SensorReading {
    /// Creates a reading after validating sensor ranges.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a percentage exceeds 100 or the
    /// temperature is outside the supported sensor range.
    pub fn new(soil_moisture: u8, temperature_c: f64, humidity: u8) -> Result<Self, ValidationError> {
        if !(TEMPERATURE_MIN_C..=TEMPERATURE_MAX_C).contains(&temperature_c) {
            return Err(ValidationError::out_of_range(
                "temperature_c",
                TEMPERATURE_MIN_C,
                TEMPERATURE_MAX_C,
                temperature_c,
            ));
        }
        Ok(Self {
            soil_moisture: Percentage::try_new(soil_moisture)?,
            temperature_c,
            humidity: Percentage::try_new(humidity)?,
        })
    }
}
