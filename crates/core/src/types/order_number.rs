//! Human-facing order number.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Externally visible order token (e.g. `FGS-1760601600000-7QK2M`).
///
/// Distinct from the internal row [`OrderId`](crate::OrderId). The store's
/// UNIQUE constraint is the source of truth for uniqueness; this type only
/// carries the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix carried by every order number minted by this system.
    pub const PREFIX: &'static str = "FGS";

    /// Wrap an existing order number (e.g. read back from the database).
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
