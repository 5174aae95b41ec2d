//! Percentage value object (0-100 scale).
//!
//! Used for relative sensor readings: soil moisture and air humidity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A value between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100);

    /// Creates a new Percentage, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a Percentage, returning error if out of range.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::out_of_range(
                "percentage",
                0.0,
                100.0,
                f64::from(value),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_new_accepts_valid_values() {
        assert_eq!(Percentage::new(0).value(), 0);
        assert_eq!(Percentage::new(55).value(), 55);
        assert_eq!(Percentage::new(100).value(), 100);
    }

    #[test]
    fn percentage_new_clamps_overflow() {
        assert_eq!(Percentage::new(130).value(), 100);
    }

    #[test]
    fn percentage_try_new_rejects_overflow() {
        assert!(Percentage::try_new(101).is_err());
        assert!(Percentage::try_new(100).is_ok());
    }

    #[test]
    fn percentage_orders_numerically() {
        assert!(Percentage::new(30) < Percentage::new(45));
    }

    #[test]
    fn percentage_displays_with_sign() {
        assert_eq!(format!("{}", Percentage::new(42)), "42%");
    }
}
