//! Film Gaming Seller Core - Shared domain types.
//!
//! This crate provides the types shared by every Film Gaming Seller component:
//! - `server` - Storefront and admin REST API
//! - `cli` - Command-line tools for migrations, admin users and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database access,
//! no HTTP. Anything that decides whether an order or status change is valid
//! without touching storage belongs here.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, money, emails, payment methods and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
