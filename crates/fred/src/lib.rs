#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/econdata-rs/fred/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cache-first access to FRED economic time series.
//!
//! This crate re-exports the core types and backend implementations, and
//! provides a [`DataManager`] that answers queries from a local
//! [`SeriesStore`] first, falling back to a remote [`DataSource`] and
//! writing fetched records through to the store.
//!
//! # Features
//!
//! - `sqlite` - SQLite-backed store (enabled by default)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fred_data::{DataManager, SeriesId, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> fred_data::Result<()> {
//!     let store = Arc::new(SqliteStore::new("fred.db")?);
//!     let manager = DataManager::fred(std::env::var("FRED_API_KEY").unwrap(), store);
//!
//!     let gdp = manager.series(&SeriesId::new("GDP")).await?;
//!     let observations = manager.observations(&gdp.id, false).await?;
//!     println!("{}: {} observations", gdp.title, observations.len());
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use fred_core::*;

// Remote client
pub use fred_api::FredApi;

// Store implementations
pub use fred_store::MemoryStore;
#[cfg(feature = "sqlite")]
pub use fred_store::SqliteStore;

// Analysis helpers
pub use fred_analysis::{
    SeriesGraph, covariance, diff, diff_percent, linear_regression, moving_average,
};

mod manager;
pub use manager::DataManager;
