//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random UserId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a UserId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Maximum accepted length for a gateway order reference.
const ORDER_ID_MAX_LEN: usize = 64;

/// Merchant-side order reference, echoed verbatim by the gateway.
///
/// Order ids travel inside the signed callback canonical string, so the
/// character set is restricted: no `=`, `&`, or whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates an OrderId after validating the reference format.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the value is empty, longer than 64
    /// characters, or contains characters that would corrupt the canonical
    /// signing string.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::empty_field("order_id"));
        }
        if value.len() > ORDER_ID_MAX_LEN {
            return Err(ValidationError::invalid_format(
                "order_id",
                format!("exceeds {} characters", ORDER_ID_MAX_LEN),
            ));
        }
        if value.chars().any(|c| c == '=' || c == '&' || c.is_whitespace()) {
            return Err(ValidationError::invalid_format(
                "order_id",
                "contains '=', '&', or whitespace",
            ));
        }
        Ok(Self(value))
    }

    /// Generates a fresh random order reference.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_are_unique() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn user_id_round_trips_through_string() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn order_id_accepts_plain_references() {
        let id = OrderId::new("ord-20260805-0001").unwrap();
        assert_eq!(id.as_str(), "ord-20260805-0001");
    }

    #[test]
    fn order_id_rejects_empty() {
        assert!(OrderId::new("").is_err());
    }

    #[test]
    fn order_id_rejects_canonical_string_separators() {
        assert!(OrderId::new("a=b").is_err());
        assert!(OrderId::new("a&b").is_err());
        assert!(OrderId::new("a b").is_err());
    }

    #[test]
    fn order_id_rejects_overlong_references() {
        let long = "x".repeat(65);
        assert!(OrderId::new(long).is_err());
    }

    #[test]
    fn generated_order_ids_are_valid_and_unique() {
        let a = OrderId::generate();
        let b = OrderId::generate();
        assert_ne!(a, b);
        assert!(OrderId::new(a.as_str().to_string()).is_ok());
    }
}
