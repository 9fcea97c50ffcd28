pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod repository;
pub mod service;
pub mod text;
pub mod transport;

#[cfg(test)]
pub mod test_helpers;

pub use config::Config;
pub use error::{Error, Result};

/// Embedded database migrations, run by the binary at startup and by the
/// test fixtures.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
