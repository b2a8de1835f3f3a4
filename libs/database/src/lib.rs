//! Database plumbing shared by the service binaries.
//!
//! # Features
//!
//! - `mongodb` (default): client construction from [`mongodb::MongoConfig`],
//!   connection retry and health checks
//! - `config`: `core_config::FromEnv` for `MongoConfig`
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "user_management");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod retry;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use retry::{RetryConfig, retry, retry_with_backoff};
