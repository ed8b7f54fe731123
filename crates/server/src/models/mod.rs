//! Domain types and session-scoped state.

mod product;
mod session;
mod transaction;

pub use product::{NewProduct, Product, ProductPatch};
pub use session::{Flash, FlashKind, clear_cart, load_cart, save_cart, set_flash, take_flash};
pub use transaction::{
    NewTransaction, NewTransactionItem, Transaction, TransactionItem, TransactionWithCashier,
};

use serde::{Deserialize, Serialize};

use tillpoint_core::{Role, UserId};

/// Session keys used by the dashboard.
pub mod session_keys {
    /// The signed-in user (a [`super::CurrentUser`]).
    pub const CURRENT_USER: &str = "current_user";
    /// The in-progress cart (a [`crate::cart::Cart`]).
    pub const CART: &str = "cart";
    /// One-shot flash notification (a [`super::Flash`]).
    pub const FLASH: &str = "flash";
}

/// The authenticated user, as stored in the session after sign-in.
///
/// Identity and the role claim come from the external session/role
/// provider; the dashboard never stores users itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
}

impl CurrentUser {
    /// Whether this session carries the elevated role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name to show in the header; falls back to the email local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or_else(|| {
            self.email
                .split('@')
                .next()
                .unwrap_or(self.email.as_str())
        })
    }
}

/// A profile row from the store's user-profile table.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_email_local_part() {
        let user = CurrentUser {
            id: UserId::random(),
            email: "dewi@example.com".to_owned(),
            full_name: None,
            role: Role::Cashier,
        };
        assert_eq!(user.display_name(), "dewi");
    }
}
