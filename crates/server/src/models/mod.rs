//! Domain models for the store.
//!
//! Repositories convert database rows into these types; route handlers
//! serialize them directly.

use serde::{Deserialize, Deserializer};

pub mod admin_user;
pub mod order;
pub mod product;

pub use admin_user::AdminUser;
pub use order::{NewOrder, Order, OrderFilter, OrderStats, OrderUpdate};
pub use product::{NewProduct, Product, ProductFilter, ProductUpdate};

/// Deserialize a nullable field of a partial update.
///
/// Used with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: an absent field stays `None` (keep), `null` becomes
/// `Some(None)` (clear) and a value becomes `Some(Some(value))` (set).
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
