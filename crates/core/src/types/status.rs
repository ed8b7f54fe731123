//! Status and role enums.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a recorded transaction.
///
/// New transactions are written as `completed`; the store may later
/// mark one `refunded` or `voided` through back-office tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Refunded,
    Voided,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Refunded => write!(f, "refunded"),
            Self::Voided => write!(f, "voided"),
        }
    }
}

/// Role claim handed down by the session provider.
///
/// `admin` unlocks the create/edit/delete affordances and the
/// admin-only navigation entries; everything else is a cashier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Cashier,
}

impl Role {
    /// Whether this role carries the elevated (administrator) claim.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Map the role string stored in the profile table.
    ///
    /// Unknown values deliberately fall back to the unprivileged role
    /// rather than erroring: a bad claim must never elevate.
    #[must_use]
    pub fn from_claim(claim: &str) -> Self {
        match claim {
            "admin" => Self::Admin,
            _ => Self::Cashier,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Cashier => write!(f, "cashier"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_claim_is_elevated() {
        assert!(Role::from_claim("admin").is_admin());
    }

    #[test]
    fn test_unknown_claim_is_not_elevated() {
        assert!(!Role::from_claim("cashier").is_admin());
        assert!(!Role::from_claim("superuser").is_admin());
        assert!(!Role::from_claim("").is_admin());
    }

    #[test]
    fn test_default_status_is_completed() {
        assert_eq!(TransactionStatus::default(), TransactionStatus::Completed);
    }
}
