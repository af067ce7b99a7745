#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/econdata-rs/fred/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for FRED economic data.
//!
//! This crate provides the foundational abstractions of the workspace:
//!
//! - [`Category`](types::Category), [`Series`](types::Series),
//!   [`Observation`](types::Observation) - Domain records
//! - [`Frequency`](frequency::Frequency) - Observation spacing
//! - [`CategoryTree`](tree::CategoryTree) - Hierarchical category index
//! - [`DataSource`](source::DataSource) - Remote fetch abstraction
//! - [`SeriesStore`](store::SeriesStore) - Local persistence abstraction

/// Error types for data operations.
pub mod error;
/// Observation frequency definitions.
pub mod frequency;
/// Remote data source trait.
pub mod source;
/// Local store trait.
pub mod store;
/// Hierarchical category index.
pub mod tree;
/// Core data types (Category, Series, Observation).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{FredError, Result};
pub use frequency::Frequency;
pub use source::DataSource;
pub use store::SeriesStore;
pub use tree::CategoryTree;
pub use types::{Category, CategoryId, Observation, Series, SeriesId};
