//! Core types for Film Gaming Seller.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod order_number;
pub mod payment;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use order_number::OrderNumber;
pub use payment::{PaymentMethod, UnknownPaymentMethod};
pub use status::*;
