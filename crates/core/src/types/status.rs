//! Status enums and the admin-driven order lifecycle.
//!
//! An order carries two independent state machines:
//!
//! ```text
//! order_status:   pending ──► completed
//!                    └──────► cancelled
//!
//! payment_status: pending ──► paid
//! ```
//!
//! Every order is created in (`pending`, `pending`). Only admin actions move
//! it afterwards, and `completed` additionally requires the payment to be
//! `paid` once the update is applied.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct InvalidStatus {
    /// Which status family was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// The wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether `self -> next` is a legal move. Re-asserting the current state is legal.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || (self == Self::Pending && next.is_terminal())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(InvalidStatus {
                kind: "order status",
                value: s.to_owned(),
            }),
        }
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    /// The wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    /// Whether `self -> next` is a legal move. Re-asserting the current state is legal.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || (self == Self::Pending && next == Self::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            _ => Err(InvalidStatus {
                kind: "payment status",
                value: s.to_owned(),
            }),
        }
    }
}

/// Rejected status change.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// The order status cannot move between these states.
    #[error("order status cannot change from {from} to {to}")]
    Order {
        /// Current state.
        from: OrderStatus,
        /// Requested state.
        to: OrderStatus,
    },
    /// The payment status cannot move between these states.
    #[error("payment status cannot change from {from} to {to}")]
    Payment {
        /// Current state.
        from: PaymentStatus,
        /// Requested state.
        to: PaymentStatus,
    },
    /// An order can only be completed once it is paid.
    #[error("order cannot be completed before payment is received")]
    CompletedBeforePaid,
}

/// The pair of statuses every order carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct OrderState {
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl OrderState {
    /// State of a freshly created order.
    pub const INITIAL: Self = Self {
        order_status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
    };

    /// Apply an admin update, leaving unspecified halves unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if either half moves illegally, or if the
    /// result would be `completed` without `paid`.
    pub fn apply(
        self,
        order_status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Self, TransitionError> {
        let next_order = order_status.unwrap_or(self.order_status);
        let next_payment = payment_status.unwrap_or(self.payment_status);

        if !self.order_status.can_transition_to(next_order) {
            return Err(TransitionError::Order {
                from: self.order_status,
                to: next_order,
            });
        }

        if !self.payment_status.can_transition_to(next_payment) {
            return Err(TransitionError::Payment {
                from: self.payment_status,
                to: next_payment,
            });
        }

        if next_order == OrderStatus::Completed && next_payment != PaymentStatus::Paid {
            return Err(TransitionError::CompletedBeforePaid);
        }

        Ok(Self {
            order_status: next_order,
            payment_status: next_payment,
        })
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin user management.
    SuperAdmin,
    /// Full access to orders, products and settings.
    Admin,
    /// Read-only access to admin data.
    Viewer,
}

impl AdminRole {
    /// The wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }

    /// Whether the role may mutate orders, products or settings.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AdminRole {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(InvalidStatus {
                kind: "admin role",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_be_cancelled_without_payment() {
        let next = OrderState::INITIAL
            .apply(Some(OrderStatus::Cancelled), None)
            .unwrap();
        assert_eq!(next.order_status, OrderStatus::Cancelled);
        assert_eq!(next.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_completed_requires_paid() {
        assert_eq!(
            OrderState::INITIAL.apply(Some(OrderStatus::Completed), None),
            Err(TransitionError::CompletedBeforePaid)
        );

        let next = OrderState::INITIAL
            .apply(Some(OrderStatus::Completed), Some(PaymentStatus::Paid))
            .unwrap();
        assert_eq!(next.order_status, OrderStatus::Completed);
        assert_eq!(next.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        let cancelled = OrderState {
            order_status: OrderStatus::Cancelled,
            payment_status: PaymentStatus::Pending,
        };
        assert_eq!(
            cancelled.apply(Some(OrderStatus::Pending), None),
            Err(TransitionError::Order {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Pending,
            })
        );

        let paid = OrderState {
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Paid,
        };
        assert!(matches!(
            paid.apply(None, Some(PaymentStatus::Pending)),
            Err(TransitionError::Payment { .. })
        ));
    }

    #[test]
    fn test_reasserting_current_state_is_noop() {
        let state = OrderState {
            order_status: OrderStatus::Completed,
            payment_status: PaymentStatus::Paid,
        };
        assert_eq!(
            state.apply(Some(OrderStatus::Completed), Some(PaymentStatus::Paid)),
            Ok(state)
        );
        assert_eq!(state.apply(None, None), Ok(state));
    }

    #[test]
    fn test_status_strings_parse() {
        assert_eq!("paid".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert_eq!(
            "cancelled".parse::<OrderStatus>().unwrap(),
            OrderStatus::Cancelled
        );
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert_eq!("viewer".parse::<AdminRole>().unwrap(), AdminRole::Viewer);
    }

    #[test]
    fn test_role_permissions() {
        assert!(AdminRole::SuperAdmin.can_write());
        assert!(AdminRole::Admin.can_write());
        assert!(!AdminRole::Viewer.can_write());
    }
}
