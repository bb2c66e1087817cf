//! Seed the catalog from a YAML file.
//!
//! The file is a list of products in the same shape the admin API accepts
//! (see `crates/cli/catalog/products.yaml`). Rows are matched by name;
//! existing products are left untouched.

use std::path::Path;

use secrecy::SecretString;
use sqlx::SqlitePool;
use tracing::{error, info};

use fgs_server::db::{self, ProductRepository};
use fgs_server::models::NewProduct;

/// Outcome of a catalog seed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Seed products from a YAML catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, or database operations fail.
pub async fn catalog(
    database_url: &SecretString,
    file_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_catalog(&content)?;
    info!(products = products.len(), "Parsed catalog");

    let pool = db::create_pool(database_url).await?;
    info!("Connected to database");

    let summary = insert_products(&pool, &products).await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.inserted);
    info!("  Products skipped (already exist): {}", summary.skipped);

    Ok(())
}

/// Parse and validate a YAML catalog.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or any product breaks a
/// catalog rule.
pub fn parse_catalog(content: &str) -> Result<Vec<NewProduct>, Box<dyn std::error::Error>> {
    let products: Vec<NewProduct> = serde_yaml::from_str(content)?;

    let errors: Vec<String> = products
        .iter()
        .filter_map(|p| p.validate().err().map(|e| format!("{}: {e}", p.name)))
        .collect();

    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    Ok(products)
}

/// Insert products whose name is not yet in the catalog.
///
/// # Errors
///
/// Returns `RepositoryError` if an insert fails.
pub async fn insert_products(
    pool: &SqlitePool,
    products: &[NewProduct],
) -> Result<SeedSummary, db::RepositoryError> {
    let repo = ProductRepository::new(pool);
    let mut summary = SeedSummary::default();

    for product in products {
        if repo.create_if_absent(product).await? {
            summary.inserted += 1;
        } else {
            summary.skipped += 1;
        }
    }

    Ok(summary)
}
