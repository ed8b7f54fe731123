//! Core domain types.

mod email;
mod id;
mod payment;
mod status;

pub use email::{Email, EmailError};
pub use id::{ProductId, TransactionId, UserId};
pub use payment::{PaymentMethod, PaymentMethodError};
pub use status::{Role, TransactionStatus};
