//! Fixed-point price value object.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Strictly positive fixed-point price.
///
/// The wire representation is always the decimal string (e.g. `"19.99"`);
/// binary floats never cross a serialization boundary, so precision is
/// preserved end to end.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Construct a price, rejecting zero and negative values.
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::validation("price must be strictly positive"));
        }
        Ok(Self(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Decimal-preserving string form used in event payloads.
    pub fn to_wire(&self) -> String {
        self.0.to_string()
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s)
            .map_err(|e| DomainError::validation(format!("invalid price '{s}': {e}")))?;
        Self::new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_strictly_positive_values() {
        let price: Price = "19.99".parse().unwrap();
        assert_eq!(price.to_wire(), "19.99");
    }

    #[test]
    fn rejects_zero_and_negative_values() {
        assert!(matches!("0".parse::<Price>(), Err(DomainError::Validation(_))));
        assert!(matches!("-1.50".parse::<Price>(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(matches!("not-a-price".parse::<Price>(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn equality_is_numeric_not_textual() {
        let a: Price = "24.99".parse().unwrap();
        let b: Price = "24.99".parse().unwrap();
        assert_eq!(a, b);
    }
}
