//! Payment method accepted at the register.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown payment method string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid payment method: {0}")]
pub struct PaymentMethodError(pub String);

/// How a transaction was paid.
///
/// The closed set of values the data store accepts for
/// `transactions.payment_method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Mobile,
}

impl PaymentMethod {
    /// Human-readable label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Mobile => "Mobile Payment",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Card => write!(f, "card"),
            Self::Mobile => write!(f, "mobile"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = PaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "mobile" => Ok(Self::Mobile),
            other => Err(PaymentMethodError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(PaymentMethod::Cash.to_string(), "cash");
        assert_eq!(PaymentMethod::Card.to_string(), "card");
        assert_eq!(PaymentMethod::Mobile.to_string(), "mobile");
    }

    #[test]
    fn test_from_str_round_trip() {
        for method in [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Mobile] {
            let parsed: PaymentMethod = method.to_string().parse().unwrap();
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::Mobile).unwrap();
        assert_eq!(json, "\"mobile\"");
    }
}
