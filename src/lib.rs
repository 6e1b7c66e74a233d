//! Filebox: file metadata records served over an authenticated GraphQL API,
//! plus the client that turns upload completions into versioned records.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod database;
pub mod graphql;
pub mod models;
pub mod repositories;
pub mod services;

// Shared by unit and integration tests
#[cfg(any(test, debug_assertions))]
pub mod test_utils;

pub use config::AppConfig;
pub use database::Database;
