//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::nullable;

use fgs_core::{
    Money, OrderId, OrderNumber, OrderState, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
};

/// A placed order. `total_amount` and `product_name` are snapshots taken at
/// placement and never recomputed.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub order_id: OrderNumber,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_line: Option<String>,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The order's current status pair.
    #[must_use]
    pub const fn state(&self) -> OrderState {
        OrderState {
            order_status: self.order_status,
            payment_status: self.payment_status,
        }
    }
}

/// A fully validated order ready to be inserted inside the placement transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderNumber,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_line: Option<String>,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Admin status/notes update body.
///
/// Omitting `notes` keeps them; `null` or a blank string clears them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderUpdate {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

/// Admin order listing filter.
#[derive(Debug, Clone, Copy)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub limit: i64,
}

/// Dashboard aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total_orders: i64,
    pub total_revenue: Money,
    pub today_orders: i64,
    pub today_revenue: Money,
}
