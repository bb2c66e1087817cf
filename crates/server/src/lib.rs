//! Film Gaming Seller HTTP API.
//!
//! Library half of the `fgs-server` binary so the router, repositories and
//! services can be driven from the CLI and from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use routes::router;
pub use state::AppState;
