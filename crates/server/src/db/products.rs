//! Product repository.
//!
//! Pool-backed reads and admin writes live on [`ProductRepository`]. The stock
//! reservation used by order placement is a free function over a connection so
//! it runs inside the caller's transaction.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use fgs_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductFilter};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: i64,
    original_price: Option<i64>,
    discount_percent: i64,
    category: String,
    subcategory: Option<String>,
    image_url: Option<String>,
    stock_quantity: i64,
    is_featured: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Money::from_minor(row.price),
            original_price: row.original_price.map(Money::from_minor),
            discount_percent: row.discount_percent,
            category: row.category,
            subcategory: row.subcategory,
            image_url: row.image_url,
            stock_quantity: row.stock_quantity,
            is_featured: row.is_featured,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Product fields captured when stock is reserved for an order.
#[derive(Debug, Clone)]
pub struct ReservedProduct {
    pub name: String,
    pub price: Money,
    pub category: String,
    pub subcategory: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ReservedRow {
    name: String,
    price: i64,
    category: String,
    subcategory: Option<String>,
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone)]
pub enum StockReservation {
    /// Stock was decremented; the product snapshot is attached.
    Reserved(ReservedProduct),
    /// No active product with that ID exists.
    NotFound,
    /// The product exists but has fewer units than requested.
    Insufficient { available: i64 },
}

/// Atomically take `quantity` units of an active product.
///
/// The decrement only applies when the row is active and holds enough stock,
/// so two concurrent reservations can never both take the last unit. When no
/// row is updated a follow-up read on the same connection tells a missing
/// product apart from a short one; the caller is expected to roll back.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn reserve_stock(
    conn: &mut SqliteConnection,
    product_id: ProductId,
    quantity: i64,
) -> Result<StockReservation, RepositoryError> {
    let reserved = sqlx::query_as::<_, ReservedRow>(
        r"
        UPDATE products
        SET stock_quantity = stock_quantity - ?1
        WHERE id = ?2 AND is_active = 1 AND stock_quantity >= ?1
        RETURNING name, price, category, subcategory
        ",
    )
    .bind(quantity)
    .bind(product_id.as_i64())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = reserved {
        return Ok(StockReservation::Reserved(ReservedProduct {
            name: row.name,
            price: Money::from_minor(row.price),
            category: row.category,
            subcategory: row.subcategory,
        }));
    }

    let available = sqlx::query_scalar::<_, i64>(
        "SELECT stock_quantity FROM products WHERE id = ?1 AND is_active = 1",
    )
    .bind(product_id.as_i64())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(available.map_or(StockReservation::NotFound, |available| {
        StockReservation::Insufficient { available }
    }))
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List products, featured first then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT * FROM products WHERE 1 = 1");

        if !filter.include_inactive {
            query.push(" AND is_active = 1");
        }
        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query.push(" AND category = ").push_bind(category.to_owned());
        }
        if let Some(subcategory) = filter.subcategory.as_deref().filter(|s| !s.is_empty()) {
            query.push(" AND subcategory = ").push_bind(subcategory.to_owned());
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            query
                .push(" AND (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if filter.featured == Some(true) {
            query.push(" AND is_featured = 1");
        }
        query.push(" ORDER BY is_featured DESC, created_at DESC, id DESC");

        let rows = query
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get an active product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE id = ?1 AND is_active = 1",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Get a product by ID regardless of its active flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ?1")
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including CHECK violations).
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products
                (name, description, price, original_price, discount_percent, category,
                 subcategory, image_url, stock_quantity, is_featured, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            RETURNING *
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.minor_units())
        .bind(product.original_price.map(Money::minor_units))
        .bind(product.discount_percent)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(&product.image_url)
        .bind(product.stock_quantity)
        .bind(product.is_featured)
        .bind(product.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Insert a product unless one with the same name already exists.
    ///
    /// Returns `true` if a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_if_absent(&self, product: &NewProduct) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO products
                (name, description, price, original_price, discount_percent, category,
                 subcategory, image_url, stock_quantity, is_featured, is_active)
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = ?1)
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.minor_units())
        .bind(product.original_price.map(Money::minor_units))
        .bind(product.discount_percent)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(&product.image_url)
        .bind(product.stock_quantity)
        .bind(product.is_featured)
        .bind(product.is_active)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Persist the editable fields of a product. Stock is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(&self, product: &Product) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products SET
                name = ?1, description = ?2, price = ?3, original_price = ?4,
                discount_percent = ?5, category = ?6, subcategory = ?7, image_url = ?8,
                is_featured = ?9, is_active = ?10, updated_at = ?11
            WHERE id = ?12
            RETURNING *
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.minor_units())
        .bind(product.original_price.map(Money::minor_units))
        .bind(product.discount_percent)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(&product.image_url)
        .bind(product.is_featured)
        .bind(product.is_active)
        .bind(Utc::now())
        .bind(product.id.as_i64())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Add `quantity` units to a product's stock and return the new level.
    ///
    /// The addition is guarded in SQL: SQLite would otherwise promote an
    /// overflowing sum to REAL and store it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if `quantity` is not positive or the
    /// new level would not fit in an `i64`.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn restock(&self, id: ProductId, quantity: i64) -> Result<i64, RepositoryError> {
        if quantity <= 0 {
            return Err(RepositoryError::Conflict(
                "restock quantity must be positive".to_owned(),
            ));
        }

        let updated = sqlx::query_scalar::<_, i64>(
            r"
            UPDATE products
            SET stock_quantity = stock_quantity + ?1, updated_at = ?2
            WHERE id = ?3 AND stock_quantity <= 9223372036854775807 - ?1
            RETURNING stock_quantity
            ",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        if let Some(stock_quantity) = updated {
            return Ok(stock_quantity);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = ?1)")
            .bind(id.as_i64())
            .fetch_one(self.pool)
            .await?;
        if exists {
            Err(RepositoryError::Conflict(
                "stock quantity would overflow".to_owned(),
            ))
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}
