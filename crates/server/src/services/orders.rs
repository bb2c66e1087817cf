//! Order placement.
//!
//! [`OrderService::create_order`] is the only code path that mints order
//! numbers and takes stock. Each call runs as one SQLite transaction:
//!
//! 1. conditionally decrement the product's stock (active and enough units)
//! 2. snapshot the unit price and compute the frozen total
//! 3. insert the order in the (`pending`, `pending`) state
//! 4. commit
//!
//! Any error before the commit drops the transaction, rolling back the
//! decrement. Nothing is retried: a caller must resubmit.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use fgs_core::{Email, Money, OrderId, OrderNumber, PaymentMethod, ProductId, TransitionError};

use crate::config::PaymentDefaults;
use crate::db::products::{self, StockReservation};
use crate::db::{OrderRepository, RepositoryError, SettingsRepository, orders};
use crate::models::{NewOrder, OrderUpdate};
use crate::services::codes;

/// Largest quantity accepted in a single order.
pub const MAX_QUANTITY: i64 = 1000;

/// Setting keys holding the payment instructions shown after checkout.
pub const BANK_ACCOUNT_KEY: &str = "bank_account";
pub const PROMPTPAY_ID_KEY: &str = "promptpay_id";
pub const LINE_ID_KEY: &str = "line_id";

/// Errors returned by order placement.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// No active product with this ID.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The product has fewer units than requested.
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i64, requested: i64 },

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Checkout request body.
///
/// Every field is optional at the type level so presence is checked here
/// rather than trusted to the HTTP layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_line: Option<String>,
    pub product_id: Option<ProductId>,
    pub quantity: Option<i64>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Payment instructions returned with a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentInfo {
    pub bank_account: String,
    pub promptpay_id: String,
    pub line_id: String,
}

/// Result of a successful placement.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub id: OrderId,
    pub order_id: OrderNumber,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i64,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_info: PaymentInfo,
}

/// Validated checkout input.
#[derive(Debug)]
struct ValidOrder {
    customer_name: String,
    customer_email: Email,
    customer_phone: String,
    customer_line: Option<String>,
    product_id: ProductId,
    quantity: i64,
    payment_method: PaymentMethod,
    notes: Option<String>,
}

/// Places orders against the catalog.
pub struct OrderService<'a> {
    pool: &'a SqlitePool,
    payment_defaults: &'a PaymentDefaults,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, payment_defaults: &'a PaymentDefaults) -> Self {
        Self {
            pool,
            payment_defaults,
        }
    }

    /// Validate, price, and persist an order while taking stock.
    ///
    /// # Errors
    ///
    /// - `OrderError::Validation` for missing or malformed input
    /// - `OrderError::ProductNotFound` if the product is missing or inactive
    /// - `OrderError::InsufficientStock` if the product has fewer units than requested
    /// - `OrderError::Repository` on storage failure (including an order number collision)
    ///
    /// No order row is written and no stock is taken on any error.
    #[instrument(skip_all, fields(product_id = ?request.product_id, quantity = ?request.quantity))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderReceipt, OrderError> {
        let order = validate(request)?;

        // Read before the transaction so nothing can fail after the commit.
        let payment_info = self.payment_info().await?;

        let mut tx = self.pool.begin().await?;

        let product =
            match products::reserve_stock(&mut *tx, order.product_id, order.quantity).await? {
                StockReservation::Reserved(product) => product,
                StockReservation::NotFound => {
                    tracing::debug!("product not available");
                    return Err(OrderError::ProductNotFound(order.product_id));
                }
                StockReservation::Insufficient { available } => {
                    tracing::warn!(available, "insufficient stock");
                    return Err(OrderError::InsufficientStock {
                        available,
                        requested: order.quantity,
                    });
                }
            };

        let total_amount = product
            .price
            .checked_mul(order.quantity)
            .ok_or_else(|| OrderError::Validation("order total is out of range".to_string()))?;

        let now = Utc::now();
        let new_order = NewOrder {
            order_id: codes::order_number(now),
            customer_name: order.customer_name,
            customer_email: order.customer_email.into_inner(),
            customer_phone: order.customer_phone,
            customer_line: order.customer_line,
            product_id: order.product_id,
            product_name: product.name,
            quantity: order.quantity,
            total_amount,
            payment_method: order.payment_method,
            notes: order.notes,
            created_at: now,
        };

        let id = orders::insert(&mut *tx, &new_order).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %new_order.order_id,
            total_amount = %total_amount,
            "order placed"
        );

        let label = product
            .subcategory
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(product.category.as_str());

        Ok(OrderReceipt {
            id,
            product_code: codes::redemption_code(label, now),
            order_id: new_order.order_id,
            product_name: new_order.product_name,
            quantity: new_order.quantity,
            total_amount,
            payment_method: new_order.payment_method,
            payment_info,
        })
    }

    /// Payment instructions: settings first, configured defaults second, empty last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the settings cannot be read.
    pub async fn payment_info(&self) -> Result<PaymentInfo, RepositoryError> {
        let settings = SettingsRepository::new(self.pool).all().await?;
        let pick = |key: &str, fallback: Option<&String>| {
            settings
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .or(fallback)
                .cloned()
                .unwrap_or_default()
        };

        Ok(PaymentInfo {
            bank_account: pick(BANK_ACCOUNT_KEY, self.payment_defaults.bank_account.as_ref()),
            promptpay_id: pick(PROMPTPAY_ID_KEY, self.payment_defaults.promptpay_id.as_ref()),
            line_id: pick(LINE_ID_KEY, self.payment_defaults.line_id.as_ref()),
        })
    }
}

/// Errors returned by an admin status update.
#[derive(Debug, Error)]
pub enum StatusUpdateError {
    /// No order with this ID.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The requested move is not allowed from the current state.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Another update changed the order first.
    #[error("order {0} was modified concurrently")]
    Conflict(OrderId),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Apply an admin status/notes update to an order.
///
/// The write is guarded on the state that was read, so two admins racing on
/// the same order cannot both succeed with stale views.
///
/// # Errors
///
/// See [`StatusUpdateError`].
#[instrument(skip(pool, update), fields(order_status = ?update.order_status, payment_status = ?update.payment_status))]
pub async fn update_status(
    pool: &SqlitePool,
    id: OrderId,
    update: OrderUpdate,
) -> Result<(), StatusUpdateError> {
    let repo = OrderRepository::new(pool);
    let current = repo
        .get(id)
        .await?
        .ok_or(StatusUpdateError::NotFound(id))?
        .state();

    let next = current.apply(update.order_status, update.payment_status)?;
    // Blank text clears the notes like an explicit null
    let notes = update.notes.map(optional);

    if !repo
        .update_state(id, current, next, notes.as_ref().map(Option::as_deref))
        .await?
    {
        // The row vanished or moved under us.
        return Err(match repo.get(id).await? {
            Some(_) => StatusUpdateError::Conflict(id),
            None => StatusUpdateError::NotFound(id),
        });
    }

    tracing::info!(
        order_status = %next.order_status,
        payment_status = %next.payment_status,
        "order status updated"
    );
    Ok(())
}

fn validate(request: CreateOrderRequest) -> Result<ValidOrder, OrderError> {
    let customer_name = required(request.customer_name, "customer_name")?;
    let customer_phone = required(request.customer_phone, "customer_phone")?;
    let customer_email = Email::parse(&required(request.customer_email, "customer_email")?)
        .map_err(|e| OrderError::Validation(format!("customer_email: {e}")))?;

    let product_id = request
        .product_id
        .ok_or_else(|| OrderError::Validation("product_id is required".to_string()))?;

    let quantity = request.quantity.unwrap_or(1);
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(OrderError::Validation(format!(
            "quantity must be between 1 and {MAX_QUANTITY}"
        )));
    }

    let payment_method = required(request.payment_method, "payment_method")?
        .parse::<PaymentMethod>()
        .map_err(|e| OrderError::Validation(e.to_string()))?;

    Ok(ValidOrder {
        customer_name,
        customer_email,
        customer_phone,
        customer_line: optional(request.customer_line),
        product_id,
        quantity,
        payment_method,
        notes: optional(request.notes),
    })
}

fn required(value: Option<String>, field: &str) -> Result<String, OrderError> {
    optional(value).ok_or_else(|| OrderError::Validation(format!("{field} is required")))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

    use super::*;
    use crate::db::products::tests::seed_product;
    use crate::db::{ProductRepository, migrate, test_pool};
    use fgs_core::{OrderStatus, PaymentStatus};

    fn request(product_id: ProductId, quantity: i64) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_name: Some("Somchai Jaidee".to_owned()),
            customer_email: Some("somchai@example.co.th".to_owned()),
            customer_phone: Some("0812345678".to_owned()),
            customer_line: Some("@somchai".to_owned()),
            product_id: Some(product_id),
            quantity: Some(quantity),
            payment_method: Some("promptpay".to_owned()),
            notes: None,
        }
    }

    async fn order_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_order_freezes_total_and_takes_stock() {
        let pool = test_pool().await;
        let defaults = PaymentDefaults::default();
        let product = seed_product(&pool, "ROV 100 Diamonds", 42, 100).await;

        let receipt = OrderService::new(&pool, &defaults)
            .create_order(request(product.id, 2))
            .await
            .unwrap();

        assert_eq!(receipt.total_amount, Money::from_major(84).unwrap());
        assert!(receipt.order_id.as_str().starts_with("FGS-"));
        assert!(receipt.product_code.starts_with("ROV-"));
        assert_eq!(receipt.product_name, "ROV 100 Diamonds");

        let products = ProductRepository::new(&pool);
        assert_eq!(products.get(product.id).await.unwrap().unwrap().stock_quantity, 98);

        // Later price edits do not touch the stored total.
        let mut repriced = products.get(product.id).await.unwrap().unwrap();
        repriced.price = Money::from_major(99).unwrap();
        products.update(&repriced).await.unwrap();

        let stored = OrderRepository::new(&pool)
            .get(receipt.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_amount, Money::from_major(84).unwrap());
        assert_eq!(stored.order_id, receipt.order_id);
        assert_eq!(stored.state(), fgs_core::OrderState::INITIAL);
    }

    #[tokio::test]
    async fn test_out_of_stock_leaves_no_trace() {
        let pool = test_pool().await;
        let defaults = PaymentDefaults::default();
        let product = seed_product(&pool, "PUBG 60 UC", 32, 0).await;

        let result = OrderService::new(&pool, &defaults)
            .create_order(request(product.id, 1))
            .await;

        assert!(matches!(
            result,
            Err(OrderError::InsufficientStock {
                available: 0,
                requested: 1
            })
        ));
        assert_eq!(order_count(&pool).await, 0);
        let stored = ProductRepository::new(&pool).get(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_missing_and_inactive_products_are_not_found() {
        let pool = test_pool().await;
        let defaults = PaymentDefaults::default();
        let service = OrderService::new(&pool, &defaults);

        let missing = service.create_order(request(ProductId::new(404), 1)).await;
        assert!(matches!(missing, Err(OrderError::ProductNotFound(_))));

        let mut product = seed_product(&pool, "DTAC Credit 20", 20, 10).await;
        product.is_active = false;
        ProductRepository::new(&pool).update(&product).await.unwrap();

        let inactive = service.create_order(request(product.id, 1)).await;
        assert!(matches!(inactive, Err(OrderError::ProductNotFound(_))));
        assert_eq!(order_count(&pool).await, 0);
        let stored = ProductRepository::new(&pool).get(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 10);
    }

    #[tokio::test]
    async fn test_validation_rejects_bad_input() {
        let pool = test_pool().await;
        let defaults = PaymentDefaults::default();
        let service = OrderService::new(&pool, &defaults);
        let product = seed_product(&pool, "ROV 100 Diamonds", 42, 100).await;

        let mut blank_name = request(product.id, 1);
        blank_name.customer_name = Some("   ".to_owned());
        let mut bad_email = request(product.id, 1);
        bad_email.customer_email = Some("not-an-email".to_owned());
        let mut unknown_method = request(product.id, 1);
        unknown_method.payment_method = Some("bitcoin".to_owned());
        let mut no_product = request(product.id, 1);
        no_product.product_id = None;

        for bad in [
            blank_name,
            bad_email,
            unknown_method,
            no_product,
            request(product.id, 0),
            request(product.id, MAX_QUANTITY + 1),
        ] {
            let result = service.create_order(bad).await;
            assert!(matches!(result, Err(OrderError::Validation(_))), "{result:?}");
        }

        assert_eq!(order_count(&pool).await, 0);
        let stored = ProductRepository::new(&pool).get(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 100);
    }

    #[tokio::test]
    async fn test_quantity_defaults_to_one() {
        let pool = test_pool().await;
        let defaults = PaymentDefaults::default();
        let product = seed_product(&pool, "AIS Credit 20", 20, 5).await;
        let mut body = request(product.id, 1);
        body.quantity = None;

        let receipt = OrderService::new(&pool, &defaults)
            .create_order(body)
            .await
            .unwrap();
        assert_eq!(receipt.quantity, 1);
        assert_eq!(receipt.total_amount, Money::from_major(20).unwrap());
    }

    #[tokio::test]
    async fn test_payment_info_prefers_settings_over_defaults() {
        let pool = test_pool().await;
        let defaults = PaymentDefaults {
            bank_account: Some("000-000-0000".to_owned()),
            promptpay_id: Some("0899999999".to_owned()),
            line_id: None,
        };
        let mut settings = BTreeMap::new();
        settings.insert(BANK_ACCOUNT_KEY.to_owned(), "123-456-7890".to_owned());
        SettingsRepository::new(&pool).set_many(&settings).await.unwrap();

        let info = OrderService::new(&pool, &defaults).payment_info().await.unwrap();
        assert_eq!(
            info,
            PaymentInfo {
                bank_account: "123-456-7890".to_owned(),
                promptpay_id: "0899999999".to_owned(),
                line_id: String::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_update_status_applies_lifecycle() {
        let pool = test_pool().await;
        let defaults = PaymentDefaults::default();
        let product = seed_product(&pool, "Free Fire 100 Diamonds", 32, 10).await;
        let receipt = OrderService::new(&pool, &defaults)
            .create_order(request(product.id, 1))
            .await
            .unwrap();

        let premature = update_status(
            &pool,
            receipt.id,
            OrderUpdate {
                order_status: Some(OrderStatus::Completed),
                ..OrderUpdate::default()
            },
        )
        .await;
        assert!(matches!(
            premature,
            Err(StatusUpdateError::Transition(TransitionError::CompletedBeforePaid))
        ));

        update_status(
            &pool,
            receipt.id,
            OrderUpdate {
                order_status: Some(OrderStatus::Completed),
                payment_status: Some(PaymentStatus::Paid),
                notes: Some(Some("sent via LINE".to_owned())),
            },
        )
        .await
        .unwrap();

        let stored = OrderRepository::new(&pool).get(receipt.id).await.unwrap().unwrap();
        assert_eq!(stored.order_status, OrderStatus::Completed);
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.notes.as_deref(), Some("sent via LINE"));
        assert_eq!(stored.total_amount, receipt.total_amount);

        let blank = serde_json::from_value(serde_json::json!({ "notes": "  " })).unwrap();
        update_status(&pool, receipt.id, blank).await.unwrap();
        let stored = OrderRepository::new(&pool).get(receipt.id).await.unwrap().unwrap();
        assert_eq!(stored.notes, None);
        assert_eq!(stored.order_status, OrderStatus::Completed);

        let missing = update_status(&pool, OrderId::new(999), OrderUpdate::default()).await;
        assert!(matches!(missing, Err(StatusUpdateError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_never_oversell() {
        const STOCK: i64 = 5;
        const BUYERS: usize = 20;

        let dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("race.db"))
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(30));
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .unwrap();
        migrate(&pool).await.unwrap();

        let product = seed_product(&pool, "ROV 100 Diamonds", 42, STOCK).await;
        let defaults = Arc::new(PaymentDefaults::default());

        let handles: Vec<_> = (0..BUYERS)
            .map(|_| {
                let pool = pool.clone();
                let defaults = Arc::clone(&defaults);
                tokio::spawn(async move {
                    OrderService::new(&pool, &defaults)
                        .create_order(request(product.id, 1))
                        .await
                })
            })
            .collect();

        let mut placed = Vec::new();
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(receipt) => placed.push(receipt.order_id),
                Err(OrderError::InsufficientStock { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(placed.len(), 5);
        assert_eq!(rejected, BUYERS - 5);

        let unique: std::collections::HashSet<_> = placed.iter().collect();
        assert_eq!(unique.len(), placed.len());

        let stored = ProductRepository::new(&pool).get(product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 0);
        assert_eq!(order_count(&pool).await, STOCK);
    }
}
