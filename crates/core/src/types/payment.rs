//! Accepted payment methods.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a payment method string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

/// How the customer intends to pay for an order.
///
/// Payment itself happens out of band; the method only selects which
/// instructions the storefront shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Promptpay,
    LinePay,
    EWallet,
}

impl PaymentMethod {
    /// All accepted methods.
    pub const ALL: [Self; 4] = [
        Self::BankTransfer,
        Self::Promptpay,
        Self::LinePay,
        Self::EWallet,
    ];

    /// The wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::Promptpay => "promptpay",
            Self::LinePay => "line_pay",
            Self::EWallet => "e_wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| UnknownPaymentMethod(s.to_owned()))
    }
}
