//! Rule-based watering recommendation.
//!
//! Pure threshold comparisons over a sensor reading; no persistence, no
//! clock. The rules, in priority order:
//!
//! 1. Soil at or below the dry threshold: water now.
//! 2. Soil in the warning band and the air is hot or dry: water soon.
//! 3. Otherwise: no action.

use serde::{Deserialize, Serialize};

use super::reading::SensorReading;
use super::thresholds::WateringThresholds;

/// What the user (or the auto-watering valve) should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WateringAction {
    WaterNow,
    WaterSoon,
    NoAction,
}

/// A recommendation with the observations that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WateringAdvice {
    pub action: WateringAction,
    pub reasons: Vec<String>,
}

/// Evaluates readings against a threshold set.
#[derive(Debug, Clone)]
pub struct WateringAdvisor {
    thresholds: WateringThresholds,
}

impl WateringAdvisor {
    pub fn new(thresholds: WateringThresholds) -> Self {
        Self { thresholds }
    }

    /// Produces a recommendation for the given reading.
    pub fn recommend(&self, reading: &SensorReading) -> WateringAdvice {
        let t = &self.thresholds;
        let mut reasons = Vec::new();

        if reading.soil_moisture <= t.soil_dry {
            reasons.push(format!(
                "soil moisture {} is at or below the dry threshold {}",
                reading.soil_moisture, t.soil_dry
            ));
            return WateringAdvice {
                action: WateringAction::WaterNow,
                reasons,
            };
        }

        if reading.soil_moisture <= t.soil_low {
            reasons.push(format!(
                "soil moisture {} is in the warning band (below {})",
                reading.soil_moisture, t.soil_low
            ));

            let hot = reading.temperature_c > t.hot_temperature_c;
            let dry_air = reading.humidity < t.dry_air_humidity;

            if hot {
                reasons.push(format!(
                    "temperature {:.1}C exceeds {:.1}C and accelerates drying",
                    reading.temperature_c, t.hot_temperature_c
                ));
            }
            if dry_air {
                reasons.push(format!(
                    "humidity {} is below {} and accelerates drying",
                    reading.humidity, t.dry_air_humidity
                ));
            }

            if hot || dry_air {
                return WateringAdvice {
                    action: WateringAction::WaterSoon,
                    reasons,
                };
            }
        }

        WateringAdvice {
            action: WateringAction::NoAction,
            reasons,
        }
    }
}

impl Default for WateringAdvisor {
    fn default() -> Self {
        Self::new(WateringThresholds::default())
    }
}
