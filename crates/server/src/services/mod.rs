//! Business logic layered over the repositories.

pub mod auth;
pub mod codes;
pub mod orders;
pub mod stats;

pub use auth::{AuthError, AuthService, Claims, TokenService};
pub use orders::{
    CreateOrderRequest, OrderError, OrderReceipt, OrderService, PaymentInfo, StatusUpdateError,
};
