//! Watering domain module.
//!
//! Rule-based watering recommendations over sensor readings.

mod advisor;
mod reading;
mod thresholds;

pub use advisor::{WateringAction, WateringAdvice, WateringAdvisor};
pub use reading::SensorReading;
pub use thresholds::WateringThresholds;
