//! Order repository.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use fgs_core::{Money, OrderId, OrderNumber, OrderState, ProductId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderFilter, OrderStats};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_id: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_line: Option<String>,
    product_id: i64,
    product_name: String,
    quantity: i64,
    total_amount: i64,
    payment_method: String,
    payment_status: String,
    order_status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let corrupt = |e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
        };

        Ok(Self {
            id: OrderId::new(row.id),
            payment_method: row.payment_method.parse().map_err(|e| corrupt(&e))?,
            payment_status: row.payment_status.parse().map_err(|e| corrupt(&e))?,
            order_status: row.order_status.parse().map_err(|e| corrupt(&e))?,
            order_id: OrderNumber::new(row.order_id),
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            customer_line: row.customer_line,
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            total_amount: Money::from_minor(row.total_amount),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert a new order in the initial (`pending`, `pending`) state.
///
/// Runs on the caller's connection so it shares the stock reservation's transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the order number is already taken.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert(
    conn: &mut SqliteConnection,
    order: &NewOrder,
) -> Result<OrderId, RepositoryError> {
    let initial = OrderState::INITIAL;

    let id = sqlx::query_scalar::<_, i64>(
        r"
        INSERT INTO orders
            (order_id, customer_name, customer_email, customer_phone, customer_line,
             product_id, product_name, quantity, total_amount, payment_method,
             payment_status, order_status, notes, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
        RETURNING id
        ",
    )
    .bind(order.order_id.as_str())
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(&order.customer_line)
    .bind(order.product_id.as_i64())
    .bind(&order.product_name)
    .bind(order.quantity)
    .bind(order.total_amount.minor_units())
    .bind(order.payment_method.as_str())
    .bind(initial.payment_status.as_str())
    .bind(initial.order_status.as_str())
    .bind(&order.notes)
    .bind(order.created_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from_unique_violation(e, "order number"))?;

    Ok(OrderId::new(id))
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an order by its row ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored enum value is unknown.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?1")
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    /// Get an order by its public order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored enum value is unknown.
    pub async fn get_by_number(
        &self,
        number: &OrderNumber,
    ) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE order_id = ?1")
            .bind(number.as_str())
            .fetch_optional(self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored enum value is unknown.
    pub async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM orders");
        if let Some(status) = filter.status {
            query.push(" WHERE order_status = ").push_bind(status.as_str());
        }
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(filter.limit);

        query
            .build_query_as::<OrderRow>()
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    /// Move an order from `expected` to `next`.
    ///
    /// `notes` follows partial-update semantics: `None` keeps the stored notes,
    /// `Some(None)` clears them and `Some(Some(text))` replaces them.
    ///
    /// The write only applies while the stored statuses still equal `expected`,
    /// so a concurrent admin edit is detected rather than overwritten. Returns
    /// `false` when no row matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_state(
        &self,
        id: OrderId,
        expected: OrderState,
        next: OrderState,
        notes: Option<Option<&str>>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders SET
                order_status = ?1,
                payment_status = ?2,
                notes = CASE WHEN ?3 THEN ?4 ELSE notes END,
                updated_at = ?5
            WHERE id = ?6 AND order_status = ?7 AND payment_status = ?8
            ",
        )
        .bind(next.order_status.as_str())
        .bind(next.payment_status.as_str())
        .bind(notes.is_some())
        .bind(notes.flatten())
        .bind(Utc::now())
        .bind(id.as_i64())
        .bind(expected.order_status.as_str())
        .bind(expected.payment_status.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Order count and revenue, overall and for orders created in `[day_start, day_end)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<OrderStats, RepositoryError> {
        let (total_orders, total_revenue, today_orders, today_revenue) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(total_amount), 0),
                    COALESCE(SUM(CASE WHEN created_at >= ?1 AND created_at < ?2 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN created_at >= ?1 AND created_at < ?2 THEN total_amount ELSE 0 END), 0)
                FROM orders
                ",
            )
            .bind(day_start)
            .bind(day_end)
            .fetch_one(self.pool)
            .await?;

        Ok(OrderStats {
            total_orders,
            total_revenue: Money::from_minor(total_revenue),
            today_orders,
            today_revenue: Money::from_minor(today_revenue),
        })
    }
}
